use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use coffee_grinder::models::{Cart, CartProduct};
use coffee_grinder::validation::convert_quantity_input;

fn products(count: i32) -> Vec<CartProduct> {
    (1..=count)
        .map(|id| CartProduct {
            coffee_id: id,
            name: format!("Coffee {id}"),
            type_name: Some("Arabica".to_string()),
            price_per_kg: Decimal::from(100 + id) + dec!(0.75),
            quantity_in_stock: dec!(500),
        })
        .collect()
}

// Filling a cart line by line; every mutation recomputes the totals.
fn cart_fill_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cart_fill");

    for size in [1, 5, 20, 50] {
        let catalogue = products(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalogue, |b, catalogue| {
            b.iter(|| {
                let mut cart = Cart::new();
                for product in catalogue {
                    cart.set_quantity(product, black_box(dec!(1.250))).ok();
                }
                cart.set_amount_paid(dec!(100000));
                black_box(cart.change())
            });
        });
    }

    group.finish();
}

fn quantity_conversion_benchmark(c: &mut Criterion) {
    let inputs = ["3.75", "3.700", "6", "0.05", "12.5", "abc"];
    c.bench_function("convert_quantity_input", |b| {
        b.iter(|| {
            for input in inputs {
                black_box(convert_quantity_input(black_box(input)));
            }
        });
    });
}

criterion_group!(benches, cart_fill_benchmark, quantity_conversion_benchmark);
criterion_main!(benches);
