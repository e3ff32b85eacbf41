use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    AggregateRoot, CustomerId, Order, OrderItem, OrderItemRecord, OrderRecord, OrderState,
};

fn items(count: usize) -> Vec<OrderItem> {
    (0..count)
        .map(|i| OrderItem::new(&format!("SKU-{i:03}"), (i % 100 + 1) as i64).unwrap())
        .collect()
}

fn bench_create_and_submit(c: &mut Criterion) {
    c.bench_function("domain/create_submit_drain", |b| {
        b.iter(|| {
            let mut order =
                Order::create(CustomerId::new(), items(3), OrderState::Pending).unwrap();
            order.submit().unwrap();
            order.take_events()
        });
    });
}

fn bench_reconstitute_from_record(c: &mut Criterion) {
    let record = OrderRecord {
        id: "11111111-1111-1111-1111-111111111111".to_string(),
        customer_id: "22222222-2222-2222-2222-222222222222".to_string(),
        order_items: (0..50)
            .map(|i| OrderItemRecord {
                article_no: format!("SKU-{i:03}"),
                quantity: 1 + i % 100,
            })
            .collect(),
        state: 1,
    };

    c.bench_function("domain/reconstitute_50_items", |b| {
        b.iter(|| Order::try_from(record.clone()).unwrap());
    });
}

fn bench_order_items_json(c: &mut Criterion) {
    let order = Order::create(CustomerId::new(), items(50), OrderState::Pending).unwrap();

    c.bench_function("domain/encode_decode_50_items", |b| {
        b.iter(|| {
            let json = serde_json::to_value(order.to_record().order_items).unwrap();
            let decoded: Vec<OrderItemRecord> = serde_json::from_value(json).unwrap();
            decoded
        });
    });
}

criterion_group!(
    benches,
    bench_create_and_submit,
    bench_reconstitute_from_record,
    bench_order_items_json,
);
criterion_main!(benches);
