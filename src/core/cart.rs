//! Cart business logic - the authenticated caller's mutable cart.
//!
//! Every operation is scoped to the caller's own cart through the auth
//! context; there is no way to address another user's cart. The cart is
//! created lazily on the first add and survives checkout, which only clears
//! its lines. Stock is not checked at add time; checkout is the enforcement
//! point.

use crate::auth::guard::AuthContext;
use crate::entities::{Cart, CartItem, Product, cart, cart_item, product};
use crate::errors::{Error, Result};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// A cart line resolved to current product data.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// The stored line
    pub item: cart_item::Model,
    /// The product it references, as of now
    pub product: product::Model,
}

/// A cart with its lines resolved to current product data.
#[derive(Debug, Clone)]
pub struct CartView {
    /// The cart record
    pub cart: cart::Model,
    /// Lines in insertion order
    pub lines: Vec<CartLine>,
}

/// Adds a product to the caller's cart, creating the cart lazily.
///
/// A line already holding the product has its quantity incremented;
/// otherwise a new line is appended.
///
/// # Errors
/// Returns `Validation` for a quantity below 1, `ProductNotFound` if the
/// product does not exist.
pub async fn add_to_cart(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    product_id: i64,
    quantity: i64,
) -> Result<CartView> {
    if quantity < 1 {
        return Err(Error::Validation {
            message: format!("quantity must be at least 1, got {quantity}"),
        });
    }

    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let txn = db.begin().await?;

    let existing_cart = Cart::find()
        .filter(cart::Column::UserId.eq(ctx.user_id))
        .one(&txn)
        .await?;
    let cart = match existing_cart {
        Some(cart) => cart,
        None => {
            cart::ActiveModel {
                user_id: Set(ctx.user_id),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let existing_line = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&txn)
        .await?;
    match existing_line {
        Some(line) => {
            let merged = line.quantity + quantity;
            let mut active: cart_item::ActiveModel = line.into();
            active.quantity = Set(merged);
            active.update(&txn).await?;
        }
        None => {
            cart_item::ActiveModel {
                cart_id: Set(cart.id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    get_cart(db, ctx).await
}

/// Retrieves the caller's cart with lines resolved to current product data.
///
/// # Errors
/// Returns `CartNotFound` when the caller has no cart yet, `ProductNotFound`
/// if a line references a product that was removed from the catalog.
pub async fn get_cart(db: &DatabaseConnection, ctx: &AuthContext) -> Result<CartView> {
    let cart = Cart::find()
        .filter(cart::Column::UserId.eq(ctx.user_id))
        .one(db)
        .await?
        .ok_or(Error::CartNotFound {
            user_id: ctx.user_id,
        })?;

    let items = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await?;

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = Product::find_by_id(item.product_id)
            .one(db)
            .await?
            .ok_or(Error::ProductNotFound {
                id: item.product_id,
            })?;
        lines.push(CartLine { item, product });
    }

    Ok(CartView { cart, lines })
}

/// Removes a product's line from the caller's cart.
///
/// # Errors
/// Returns `CartNotFound` when the caller has no cart, `ProductNotInCart`
/// when no line holds the product.
pub async fn remove_from_cart(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    product_id: i64,
) -> Result<CartView> {
    let cart = Cart::find()
        .filter(cart::Column::UserId.eq(ctx.user_id))
        .one(db)
        .await?
        .ok_or(Error::CartNotFound {
            user_id: ctx.user_id,
        })?;

    let line = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?
        .ok_or(Error::ProductNotInCart { product_id })?;

    line.delete(db).await?;
    get_cart(db, ctx).await
}
