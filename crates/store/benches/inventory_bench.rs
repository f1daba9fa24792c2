use common::{Money, ProductId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::ProductStock;
use store::{InMemoryInventoryStore, InventoryStore};

fn seeded_store(stock: u32) -> InMemoryInventoryStore {
    InMemoryInventoryStore::with_products([ProductStock::new(
        "p1",
        "Widget",
        Money::from_cents(999),
        stock,
        "seller-1",
    )])
}

fn bench_decrement(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_store(u32::MAX);
    let id = ProductId::new("p1");

    c.bench_function("inventory/decrement", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.decrement(&id, 1, None).await.unwrap();
            });
        });
    });
}

fn bench_keyed_replay(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_store(10);
    let id = ProductId::new("p1");
    rt.block_on(async {
        store.decrement(&id, 1, Some("chk:p1")).await.unwrap();
    });

    c.bench_function("inventory/keyed_replay", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.decrement(&id, 1, Some("chk:p1")).await.unwrap();
            });
        });
    });
}

fn bench_contended_decrements(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("inventory/contended_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = seeded_store(50);
                let mut handles = Vec::with_capacity(100);
                for _ in 0..100 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store.decrement(&ProductId::new("p1"), 1, None).await
                    }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }
            });
        });
    });
}

fn bench_get_product(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_store(100);
    let id = ProductId::new("p1");

    c.bench_function("inventory/get_product", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.get_product(&id).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_decrement,
    bench_keyed_replay,
    bench_contended_decrements,
    bench_get_product
);
criterion_main!(benches);
