use common::OrderId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{CartHandle, CartService, LineItem, Money, Product, ProductId, calculate_totals};
use record_store::{InMemoryRecordStore, RecordStoreExt};

fn make_items(count: usize) -> Vec<LineItem> {
    let order_id = OrderId::from_string("BENCH001");
    (0..count)
        .map(|i| {
            LineItem::new(
                order_id.clone(),
                ProductId::new(format!("p-{i}")),
                format!("Product {i}"),
                (i % 5 + 1) as u32,
                Money::from_cents(1999 + i as i64),
            )
        })
        .collect()
}

fn bench_pricing(c: &mut Criterion) {
    let small = make_items(3);
    let large = make_items(100);

    c.bench_function("pricing/3_items", |b| {
        b.iter(|| calculate_totals(&small));
    });

    c.bench_function("pricing/100_items", |b| {
        b.iter(|| calculate_totals(&large));
    });
}

fn bench_add_to_cart(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryRecordStore::new();
    let product = Product::new("Bench Serum", 150, 0, 1_000_000);
    let product_id = product.id.clone();
    rt.block_on(async { store.save(&product).await.unwrap() });
    let service = CartService::new(store);

    c.bench_function("cart/add_product_new_cart", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut handle = CartHandle::new();
                service
                    .add_product(&mut handle, &product_id, 1)
                    .await
                    .unwrap();
            });
        });
    });

    let mut handle = CartHandle::new();
    c.bench_function("cart/add_product_existing_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .add_product(&mut handle, &product_id, 1)
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_pricing, bench_add_to_cart);
criterion_main!(benches);
