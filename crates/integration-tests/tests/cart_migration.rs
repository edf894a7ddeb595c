//! Anonymous-to-authenticated migration scenarios for cart and favorites.

use std::sync::Arc;

use souq_client::cart::{CartAction, CartStore};
use souq_client::favorites::{FavoritesAction, FavoritesStore};
use souq_client::notify::TracingNotifier;
use souq_client::persistence::{ANONYMOUS_CART_KEY, FAVORITES_KEY, LocalStore};
use souq_client::models::CartItem;
use souq_core::ProductId;

use souq_integration_tests::{FakeCartRemote, FakeFavoritesRemote, product, session};

fn notifier() -> Arc<TracingNotifier> {
    Arc::new(TracingNotifier)
}

#[tokio::test]
async fn anonymous_cart_migrates_into_empty_remote_cart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = LocalStore::open(dir.path()).expect("open local store");

    // Visitor puts 2 units of product A in the cart before signing in
    let mut cart = CartStore::anonymous(local.clone(), notifier());
    cart.dispatch(CartAction::Add {
        product: product(1, 10),
        quantity: 2,
    })
    .await
    .expect("anonymous add");

    let remote = Arc::new(FakeCartRemote::default());
    cart.login(remote.clone(), session()).await.expect("login");

    // Remote cart now contains {A: 2}
    let items = remote.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.id, ProductId::new(1));
    assert_eq!(items[0].quantity, 2);

    // And the local key is cleared
    let persisted: Vec<CartItem> = local.load(ANONYMOUS_CART_KEY);
    assert!(persisted.is_empty());
}

#[tokio::test]
async fn migration_sums_quantities_per_product() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = LocalStore::open(dir.path()).expect("open local store");

    let mut cart = CartStore::anonymous(local.clone(), notifier());
    cart.dispatch(CartAction::Add {
        product: product(1, 10),
        quantity: 2,
    })
    .await
    .expect("add product 1");
    cart.dispatch(CartAction::Add {
        product: product(2, 20),
        quantity: 1,
    })
    .await
    .expect("add product 2");

    // The user's previous session left {1: 3} on the server
    let remote = Arc::new(FakeCartRemote::default());
    remote.seed(product(1, 10), 3);

    cart.login(remote.clone(), session()).await.expect("login");

    let mut items = remote.items();
    items.sort_by_key(|item| item.product.id);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].quantity, 5); // 3 remote + 2 local
    assert_eq!(items[1].quantity, 1);
    assert_eq!(cart.state().total_quantity(), 6);
}

#[tokio::test]
async fn post_login_mutations_stay_remote() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = LocalStore::open(dir.path()).expect("open local store");

    let mut cart = CartStore::anonymous(local.clone(), notifier());
    let remote = Arc::new(FakeCartRemote::default());
    cart.login(remote.clone(), session()).await.expect("login");

    cart.dispatch(CartAction::Add {
        product: product(9, 7),
        quantity: 1,
    })
    .await
    .expect("remote add");
    cart.dispatch(CartAction::SetQuantity {
        product: ProductId::new(9),
        quantity: 4,
    })
    .await
    .expect("remote set quantity");

    assert_eq!(remote.items()[0].quantity, 4);

    // Nothing leaked into local storage after login
    let persisted: Vec<CartItem> = local.load(ANONYMOUS_CART_KEY);
    assert!(persisted.is_empty());
}

#[tokio::test]
async fn favorites_migration_is_a_set_union() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = LocalStore::open(dir.path()).expect("open local store");

    let mut favorites = FavoritesStore::anonymous(local.clone(), notifier());
    favorites
        .dispatch(FavoritesAction::Add(product(1, 10)))
        .await
        .expect("add 1");
    favorites
        .dispatch(FavoritesAction::Add(product(2, 10)))
        .await
        .expect("add 2");

    let remote = Arc::new(FakeFavoritesRemote::default());
    remote.seed(product(2, 10));
    remote.seed(product(3, 10));

    favorites
        .login(remote.clone(), session())
        .await
        .expect("login");

    // {1, 2} ∪ {2, 3} = {1, 2, 3}, deduplicated on both sides
    assert_eq!(favorites.state().count(), 3);
    let mut ids = remote.ids();
    ids.sort();
    assert_eq!(
        ids,
        vec![ProductId::new(1), ProductId::new(2), ProductId::new(3)]
    );

    let persisted: Vec<souq_client::models::Product> = local.load(FAVORITES_KEY);
    assert!(persisted.is_empty());
}

#[tokio::test]
async fn logout_returns_to_an_empty_anonymous_cart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = LocalStore::open(dir.path()).expect("open local store");

    let remote = Arc::new(FakeCartRemote::default());
    remote.seed(product(1, 10), 2);
    let mut cart = CartStore::authenticated(remote, session(), notifier())
        .await
        .expect("authenticated");
    assert_eq!(cart.state().total_quantity(), 2);

    cart.logout(local.clone());
    assert!(cart.state().is_empty());

    // New anonymous mutations persist locally again
    cart.dispatch(CartAction::Add {
        product: product(5, 3),
        quantity: 1,
    })
    .await
    .expect("anonymous add");
    let persisted: Vec<CartItem> = local.load(ANONYMOUS_CART_KEY);
    assert_eq!(persisted.len(), 1);
}
