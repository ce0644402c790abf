//! Account, wishlist and admin scenarios driven through `Session`.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use mystery_sack_core::{OrderId, OrderStatus, PhoneNumber, ProductId};
use mystery_sack_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, USER_EMAIL, USER_PASSWORD, add_times, database_with, fixed_now,
    product, signed_in,
};
use mystery_sack_storefront::db::RepositoryError;
use mystery_sack_storefront::models::{ProfileUpdate, VariationSelections};
use mystery_sack_storefront::services::admin::AdminError;
use mystery_sack_storefront::services::auth::AuthError;
use mystery_sack_storefront::services::catalog::{ListingFilter, PriceRange};
use mystery_sack_storefront::services::checkout::CheckoutField;
use mystery_sack_storefront::{AppError, CheckoutOutcome, Database, Session, StorefrontConfig};

fn secret(s: &str) -> SecretString {
    SecretString::from(s)
}

fn place_order(session: &mut Session, db: &mut Database, product_id: ProductId) -> i32 {
    add_times(session, db, product_id, 1).unwrap();
    session.start_checkout().unwrap();
    session
        .set_checkout_field(CheckoutField::Address, "123 Mango St, Dasmariñas")
        .unwrap();
    let now = fixed_now();
    session.continue_checkout(db, now).unwrap();
    session.continue_checkout(db, now).unwrap();
    match session.continue_checkout(db, now).unwrap() {
        CheckoutOutcome::Placed(order) => order.id.as_i32(),
        CheckoutOutcome::Step(step) => panic!("stopped at {step}"),
    }
}

#[test]
fn sign_up_then_sign_in() {
    let mut db = Database::seeded().unwrap();
    let mut session = Session::new(&StorefrontConfig::default());

    let user = session
        .sign_up(
            &mut db,
            "rhea@example.com",
            &secret("sack-lover"),
            &secret("sack-lover"),
            "+63 917 555 0101",
        )
        .unwrap();
    assert_eq!(user.phone_number.as_str(), "9175550101");
    assert!(session.user().is_none());

    let signed_in_user = session
        .sign_in(&mut db, "rhea@example.com", &secret("sack-lover"))
        .unwrap();
    assert_eq!(signed_in_user.id, user.id);
    assert!(session.auth().show_disclaimer());

    session.dismiss_disclaimer();
    assert!(!session.auth().show_disclaimer());
}

#[test]
fn sign_up_rejections() {
    let mut db = Database::seeded().unwrap();
    let mut session = Session::new(&StorefrontConfig::default());

    let err = session
        .sign_up(&mut db, USER_EMAIL, &secret("secret1"), &secret("secret1"), "9171234567")
        .unwrap_err();
    assert_eq!(err.user_message(), "Email already exists");

    let err = session
        .sign_up(&mut db, "new@example.com", &secret("secret1"), &secret("secret2"), "9171234567")
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::PasswordMismatch)));

    let err = session
        .sign_up(&mut db, "new@example.com", &secret("abc"), &secret("abc"), "9171234567")
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::WeakPassword(_))));

    let err = session
        .sign_up(&mut db, "new@example.com", &secret("secret1"), &secret("secret1"), "12345")
        .unwrap_err();
    assert_eq!(err.user_message(), "Phone number must be 10 digits");

    assert_eq!(db.users.len(), 2);
}

#[test]
fn wrong_password_keeps_session_signed_out() {
    let mut db = Database::seeded().unwrap();
    let mut session = Session::new(&StorefrontConfig::default());

    let err = session
        .sign_in(&mut db, USER_EMAIL, &secret("not-it"))
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(session.user().is_none());

    assert!(session.reset_password(&mut db, USER_EMAIL).is_ok());
    assert!(matches!(
        session.reset_password(&mut db, "ghost@example.com"),
        Err(AppError::Auth(AuthError::UserNotFound))
    ));
}

#[test]
fn admin_sign_in_has_no_disclaimer() {
    let mut db = Database::seeded().unwrap();
    let admin = signed_in(&mut db, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
    assert!(admin.user().unwrap().is_admin());
    assert!(!admin.auth().show_disclaimer());
}

#[test]
fn profile_updates_feed_checkout_defaults() {
    let mut db = database_with(vec![product(1, 300, 2)]).unwrap();
    let mut session = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();

    session
        .update_profile(
            &mut db,
            ProfileUpdate {
                name: Some("Maria Santos".to_string()),
                phone_number: Some(PhoneNumber::parse("0918 765 4321").unwrap()),
                address: Some("Zone 1-4, Dasmariñas".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .unwrap();

    // A fresh sign-in sees the stored profile.
    let mut session = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();
    assert_eq!(session.user().unwrap().name.as_deref(), Some("Maria Santos"));

    add_times(&mut session, &db, ProductId::new(1), 1).unwrap();
    let form = session.start_checkout().unwrap().form().clone();
    assert_eq!(form.name, "Maria Santos");
    assert_eq!(form.phone_number, "9187654321");
    assert_eq!(form.address, "Zone 1-4, Dasmariñas");
}

#[test]
fn switching_accounts_restarts_checkout() {
    let mut db = database_with(vec![product(1, 300, 2)]).unwrap();
    let mut session = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();
    add_times(&mut session, &db, ProductId::new(1), 1).unwrap();
    session.start_checkout().unwrap();
    session
        .set_checkout_field(CheckoutField::Address, "123 Mango St, Dasmariñas")
        .unwrap();

    // Signing in again as the same account resumes the flow.
    session
        .sign_in(&mut db, USER_EMAIL, &secret(USER_PASSWORD))
        .unwrap();
    assert!(session.checkout().is_some());

    session
        .sign_in(&mut db, ADMIN_EMAIL, &secret(ADMIN_PASSWORD))
        .unwrap();
    assert!(session.checkout().is_none());
    assert!(matches!(
        session.continue_checkout(&mut db, fixed_now()),
        Err(AppError::BadRequest(_))
    ));

    let form = session.start_checkout().unwrap().form().clone();
    assert_eq!(form.name, "Admin User");
    assert_eq!(form.phone_number, "9987654321");
    assert!(form.address.is_empty());

    let order_id = place_order(&mut session, &mut db, ProductId::new(1));
    let admin_id = session.user().unwrap().id;
    assert_eq!(db.orders.get(OrderId::new(order_id)).unwrap().user_id, admin_id);

    let shopper = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();
    assert!(shopper.my_orders(&db).unwrap().is_empty());
}

#[test]
fn wishlist_toggles_and_persists() {
    let mut db = Database::seeded().unwrap();
    let mut session = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();

    assert!(session.toggle_wishlist(&mut db, ProductId::new(3)).unwrap());
    assert!(session.user().unwrap().has_wishlisted(ProductId::new(3)));

    let err = session.toggle_wishlist(&mut db, ProductId::new(99)).unwrap_err();
    assert!(matches!(err, AppError::Database(RepositoryError::NotFound(_))));

    let again = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();
    assert!(again.user().unwrap().has_wishlisted(ProductId::new(3)));

    assert!(!session.toggle_wishlist(&mut db, ProductId::new(3)).unwrap());
    assert!(session.user().unwrap().wishlist.is_empty());
}

#[test]
fn signed_out_shoppers_can_browse_but_not_buy() {
    let db = Database::seeded().unwrap();
    let mut session = Session::new(&StorefrontConfig::default());

    let filter = ListingFilter {
        search: "shoes".to_string(),
        category: Some("accessories".to_string()),
        price_range: PriceRange::From500To1000,
    };
    let ids: Vec<i32> = session
        .list_products(&db, &filter)
        .iter()
        .map(|p| p.id.as_i32())
        .collect();
    assert_eq!(ids, vec![2, 4]);

    let err = session
        .add_to_cart(&db, ProductId::new(2), VariationSelections::new())
        .unwrap_err();
    assert_eq!(err.user_message(), "Please sign in to continue");
    assert!(matches!(session.my_orders(&db), Err(AppError::Auth(AuthError::NotSignedIn))));
}

#[test]
fn admin_moves_order_through_lifecycle() {
    let mut db = database_with(vec![product(1, 450, 2)]).unwrap();
    let mut shopper = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();
    let order_id = place_order(&mut shopper, &mut db, ProductId::new(1));
    let admin = signed_in(&mut db, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
    let id = OrderId::new(order_id);

    assert!(matches!(
        shopper.admin_advance_order(&mut db, id, fixed_now()),
        Err(AppError::Auth(AuthError::Forbidden))
    ));

    let mut statuses = Vec::new();
    for _ in 0..3 {
        statuses.push(admin.admin_advance_order(&mut db, id, fixed_now()).unwrap().status);
    }
    assert_eq!(
        statuses,
        vec![OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered]
    );

    let orders = shopper.my_orders(&db).unwrap();
    let order = orders.first().unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.tracking_number.is_some());

    let err = admin.admin_cancel_order(&mut db, id, fixed_now()).unwrap_err();
    assert!(matches!(err, AppError::Admin(AdminError::InvalidTransition { .. })));
}

#[test]
fn admin_cancel_returns_stock() {
    let mut db = database_with(vec![product(1, 450, 2)]).unwrap();
    let mut shopper = signed_in(&mut db, USER_EMAIL, USER_PASSWORD).unwrap();
    let first = place_order(&mut shopper, &mut db, ProductId::new(1));
    let second = place_order(&mut shopper, &mut db, ProductId::new(1));
    assert_eq!(db.products.get(ProductId::new(1)).unwrap().stock, 0);

    let admin = signed_in(&mut db, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
    let ids: Vec<i32> = admin
        .admin_orders(&mut db)
        .unwrap()
        .iter()
        .map(|order| order.id.as_i32())
        .collect();
    assert_eq!(ids, vec![second, first]);

    let cancelled = admin
        .admin_cancel_order(&mut db, OrderId::new(first), fixed_now())
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let sack = db.products.get(ProductId::new(1)).unwrap();
    assert_eq!((sack.stock, sack.sold_count), (1, 1));

    // The returned unit can be bought again.
    add_times(&mut shopper, &db, ProductId::new(1), 1).unwrap();
}

#[test]
fn admin_catalog_edits_show_in_listing() {
    let mut db = database_with(vec![product(1, 450, 2)]).unwrap();
    let admin = signed_in(&mut db, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();

    let mut new_product = product(0, 2500, 4);
    new_product.name = "Premium Anime Mystery Box".to_string();
    new_product.category = "collectibles".to_string();
    let saved = admin.admin_save_product(&mut db, new_product).unwrap();
    assert_eq!(saved.id, ProductId::new(2));

    let filter = ListingFilter {
        price_range: PriceRange::From2000,
        ..ListingFilter::default()
    };
    let names: Vec<&str> = admin
        .list_products(&db, &filter)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Premium Anime Mystery Box"]);

    let mut bad = product(0, -1, 1);
    bad.name = "Broken".to_string();
    let err = admin.admin_save_product(&mut db, bad).unwrap_err();
    assert!(matches!(err, AppError::Admin(AdminError::InvalidProduct(_))));

    admin.admin_delete_product(&mut db, saved.id).unwrap();
    assert!(admin.list_products(&db, &filter).is_empty());
}
