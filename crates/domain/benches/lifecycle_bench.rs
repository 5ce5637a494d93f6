use chrono::Utc;
use common::{Money, OrderId, OrderNumber, UserId};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use domain::checkout::{self, NewOrder, NewOrderItem};
use domain::{Actor, Order, OrderStatus, advance, profit_report};

fn sample_order(lines: usize) -> Order {
    let items = (0..lines)
        .map(|i| NewOrderItem {
            product_id: format!("SKU-{i:04}").into(),
            product_name: format!("Product {i}"),
            quantity: 3,
            unit_price: Money::from_cents(2_500),
            selling_price: Some(Money::from_cents(3_200)),
        })
        .collect();

    let (order, _) = checkout::create(
        NewOrder {
            id: OrderId::new(),
            order_number: OrderNumber::new("WS-20250101-BENCH0"),
            user_id: UserId::new(),
            items,
            delivery_address: "1 Warehouse Way".to_string(),
            delivery_notes: None,
        },
        Utc::now(),
    )
    .unwrap();
    order
}

fn bench_checkout(c: &mut Criterion) {
    c.bench_function("checkout_create_10_lines", |b| {
        b.iter(|| black_box(sample_order(10)))
    });
}

fn bench_advance(c: &mut Criterion) {
    let order = sample_order(10);
    let admin = Actor::admin("bench");
    let now = Utc::now();

    c.bench_function("advance_to_confirmed", |b| {
        b.iter(|| {
            black_box(
                advance(
                    black_box(&order),
                    OrderStatus::Confirmed,
                    &admin,
                    None,
                    now,
                )
                .unwrap(),
            )
        })
    });
}

fn bench_profit_report(c: &mut Criterion) {
    let order = sample_order(50);

    c.bench_function("profit_report_50_lines", |b| {
        b.iter(|| black_box(profit_report(black_box(&order))))
    });
}

criterion_group!(benches, bench_checkout, bench_advance, bench_profit_report);
criterion_main!(benches);
