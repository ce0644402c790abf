//! Cart store invariants under random operation sequences.
//!
//! Each run uses a fixed seed so a failure reproduces exactly.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use mystery_sack_core::{CurrencyCode, Price, ProductId};
use mystery_sack_integration_tests::product;
use mystery_sack_storefront::models::Product;
use mystery_sack_storefront::services::cart::{CartError, CartStore};

fn catalog() -> Vec<Product> {
    vec![
        product(1, 250, 3),
        product(2, 600, 1),
        product(3, 1500, 5),
        product(4, 99, 0),
        product(5, 350, 2),
    ]
}

fn assert_invariants(cart: &CartStore) {
    let mut seen = HashSet::new();
    for item in cart.items() {
        assert!(item.quantity >= 1, "line {} has quantity 0", item.product.id);
        assert!(seen.insert(item.product.id), "duplicate line {}", item.product.id);
    }

    let expected: Decimal = cart
        .items()
        .iter()
        .map(|item| item.product.price.amount * Decimal::from(item.quantity))
        .sum();
    assert_eq!(cart.total(), Price::new(expected, CurrencyCode::PHP));
    assert_eq!(
        cart.item_count(),
        cart.items().iter().map(|item| item.quantity).sum::<u32>()
    );
}

#[test]
fn random_operations_preserve_invariants() {
    let products = catalog();

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cart = CartStore::default();

        for _ in 0..200 {
            let product = &products[rng.random_range(0..products.len())];
            match rng.random_range(0..4) {
                0 | 1 => {
                    let before = cart.get(product.id).map_or(0, |item| item.quantity);
                    match cart.add_item(product) {
                        Ok(()) => {
                            assert_eq!(cart.get(product.id).unwrap().quantity, before + 1);
                        }
                        Err(CartError::OutOfStock { requested, available, .. }) => {
                            assert_eq!(requested, before + 1);
                            assert_eq!(available, product.stock);
                            assert_eq!(
                                cart.get(product.id).map_or(0, |item| item.quantity),
                                before
                            );
                        }
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
                2 => {
                    let quantity = rng.random_range(-2..6_i64);
                    let before = cart.get(product.id).map(|item| item.quantity);
                    let changed = cart.update_quantity(product.id, quantity);
                    let after = cart.get(product.id).map(|item| item.quantity);
                    if changed {
                        assert_eq!(after, Some(u32::try_from(quantity).unwrap()));
                    } else {
                        assert_eq!(after, before);
                    }
                }
                _ => {
                    let existed = cart.get(product.id).is_some();
                    assert_eq!(cart.remove_item(product.id), existed);
                    assert!(cart.get(product.id).is_none());
                }
            }
            assert_invariants(&cart);
        }
    }
}

#[test]
fn out_of_stock_product_never_enters_cart() {
    let products = catalog();
    let mut rng = StdRng::seed_from_u64(7);
    let mut cart = CartStore::default();

    for _ in 0..100 {
        let product = &products[rng.random_range(0..products.len())];
        let _ = cart.add_item(product);
    }

    assert!(cart.get(ProductId::new(4)).is_none());
    for item in cart.items() {
        assert!(item.quantity <= item.product.stock);
    }
}

#[test]
fn lines_keep_first_add_order() {
    let products = catalog();
    let mut cart = CartStore::default();

    cart.add_item(&products[2]).unwrap();
    cart.add_item(&products[0]).unwrap();
    cart.add_item(&products[2]).unwrap();
    cart.add_item(&products[4]).unwrap();

    let order: Vec<i32> = cart.items().iter().map(|item| item.product.id.as_i32()).collect();
    assert_eq!(order, vec![3, 1, 5]);
    assert_eq!(cart.total().to_string(), "₱3,600");
}

#[test]
fn snapshot_outlives_clear() {
    let products = catalog();
    let mut cart = CartStore::default();
    cart.add_item(&products[0]).unwrap();
    cart.add_item(&products[0]).unwrap();

    let snapshot = cart.snapshot();
    assert_eq!(snapshot.item_count(), 2);

    cart.clear();
    assert!(cart.is_empty());
    assert_eq!(cart.total(), Price::zero(CurrencyCode::PHP));
    assert_eq!(snapshot.total.to_string(), "₱500");
}
