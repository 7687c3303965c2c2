//! Invoice business logic - the checkout workflow and invoice
//! administration.
//!
//! Checkout converts the caller's cart into a persisted invoice while
//! decrementing stock. Every step runs inside one database transaction, so
//! a failure on any line leaves stock, cart, and invoices untouched. The
//! decrement itself is a conditional column update that only fires while the
//! row still holds the requested quantity, which serializes the
//! read-check-decrement sequence at the storage layer and keeps interleaved
//! checkouts from driving a count negative.

use crate::auth::guard::AuthContext;
use crate::entities::{
    Cart, CartItem, Invoice, InvoiceItem, InvoiceStatus, Product, cart, cart_item, invoice,
    invoice_item, product,
};
use crate::errors::{Error, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// An invoice together with its frozen snapshot lines.
#[derive(Debug, Clone)]
pub struct InvoiceView {
    /// The invoice record
    pub invoice: invoice::Model,
    /// Snapshot lines in insertion order
    pub items: Vec<invoice_item::Model>,
}

async fn load_view<C>(db: &C, invoice: invoice::Model) -> Result<InvoiceView>
where
    C: ConnectionTrait,
{
    let items = InvoiceItem::find()
        .filter(invoice_item::Column::InvoiceId.eq(invoice.id))
        .order_by_asc(invoice_item::Column::Id)
        .all(db)
        .await?;
    Ok(InvoiceView { invoice, items })
}

/// Converts the caller's cart into a pending invoice. Client only.
///
/// The workflow, all inside one transaction:
/// 1. resolve every cart line's product, rejecting missing or zero-stock
///    products;
/// 2. freeze a {product id, quantity, unit price} snapshot per line and
///    compute the total;
/// 3. persist the invoice and its lines;
/// 4. decrement each product's stock by the line quantity through a
///    conditional update that refuses to go below zero;
/// 5. clear the cart's lines, keeping the cart itself.
///
/// Supplying the same `idempotency_key` as an earlier successful checkout
/// returns that invoice instead of creating another, so clients can retry
/// safely.
///
/// # Errors
/// Returns `Forbidden` for non-client callers, `EmptyCart` when there is no
/// cart or it has no lines, `ProductUnavailable` for a missing or
/// out-of-stock product, `InsufficientStock` when a line asks for more than
/// is on hand. On any error no invoice exists, no stock moved, and the cart
/// is untouched.
pub async fn checkout(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    idempotency_key: Option<String>,
) -> Result<InvoiceView> {
    ctx.require_client()?;

    // A retried checkout returns the invoice the first attempt produced.
    if let Some(key) = idempotency_key.as_deref() {
        let existing = Invoice::find()
            .filter(invoice::Column::UserId.eq(ctx.user_id))
            .filter(invoice::Column::IdempotencyKey.eq(key))
            .one(db)
            .await?;
        if let Some(existing) = existing {
            return load_view(db, existing).await;
        }
    }

    let txn = db.begin().await?;

    let cart = Cart::find()
        .filter(cart::Column::UserId.eq(ctx.user_id))
        .one(&txn)
        .await?
        .ok_or(Error::EmptyCart)?;
    let lines = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .order_by_asc(cart_item::Column::Id)
        .all(&txn)
        .await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }

    // Freeze the snapshot; later product edits must not reach this invoice.
    let mut snapshot = Vec::with_capacity(lines.len());
    let mut total = 0.0;
    for line in &lines {
        let resolved = Product::find_by_id(line.product_id).one(&txn).await?;
        let resolved = match resolved {
            Some(p) if p.stock > 0 => p,
            _ => {
                return Err(Error::ProductUnavailable {
                    id: line.product_id,
                });
            }
        };
        total += resolved.price * line.quantity as f64;
        snapshot.push((resolved, line.quantity));
    }

    let created = invoice::ActiveModel {
        user_id: Set(ctx.user_id),
        status: Set(InvoiceStatus::Pending),
        total: Set(total),
        idempotency_key: Set(idempotency_key),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(snapshot.len());
    for (prod, quantity) in &snapshot {
        let item = invoice_item::ActiveModel {
            invoice_id: Set(created.id),
            product_id: Set(prod.id),
            quantity: Set(*quantity),
            unit_price: Set(prod.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    // Conditional decrement: the row only moves while it still holds the
    // requested quantity, re-checked atomically at the storage layer.
    for (prod, quantity) in &snapshot {
        let result = Product::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).sub(*quantity),
            )
            .filter(product::Column::Id.eq(prod.id))
            .filter(product::Column::Stock.gte(*quantity))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::InsufficientStock {
                id: prod.id,
                requested: *quantity,
                available: prod.stock,
            });
        }
    }

    CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(
        invoice_id = created.id,
        user_id = ctx.user_id,
        total,
        "checkout completed"
    );
    Ok(InvoiceView {
        invoice: created,
        items,
    })
}

/// Retrieves one invoice with its lines. Owner or administrator.
///
/// # Errors
/// Returns `InvoiceNotFound` if the id does not exist, `Forbidden` when the
/// caller is neither the owner nor an admin.
pub async fn get_invoice(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    invoice_id: i64,
) -> Result<InvoiceView> {
    let found = Invoice::find_by_id(invoice_id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;
    ctx.require_self_or_admin(found.user_id)?;
    load_view(db, found).await
}

/// Retrieves all of a user's invoices, newest first. Owner or administrator.
///
/// # Errors
/// Returns `Forbidden` when the caller is neither the target user nor an
/// admin.
pub async fn list_invoices(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    user_id: i64,
) -> Result<Vec<InvoiceView>> {
    ctx.require_self_or_admin(user_id)?;

    let invoices = Invoice::find()
        .filter(invoice::Column::UserId.eq(user_id))
        .order_by_desc(invoice::Column::CreatedAt)
        .all(db)
        .await?;

    let mut views = Vec::with_capacity(invoices.len());
    for found in invoices {
        views.push(load_view(db, found).await?);
    }
    Ok(views)
}

/// One replacement line for an invoice update.
#[derive(Debug, Clone)]
pub struct InvoiceLineArgs {
    /// Product the line references; must exist
    pub product_id: i64,
    /// Invoiced quantity, at least 1
    pub quantity: i64,
}

/// Arguments for an admin invoice update. Empty arguments are a no-op.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceArgs {
    /// New lifecycle state, as text
    pub status: Option<String>,
    /// Replacement line list
    pub lines: Option<Vec<InvoiceLineArgs>>,
}

/// Updates an invoice's status and/or replaces its lines. Administrator
/// only.
///
/// Replacement lines are re-validated against the catalog and re-frozen at
/// current unit prices, and the total is recomputed. Stock is not adjusted
/// here; only checkout and invoice deletion move stock.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `Validation` for an unknown
/// status or a quantity below 1, `InvoiceNotFound` if the invoice is
/// missing, `ProductNotFound` if a replacement line references a product
/// that does not exist.
pub async fn update_invoice(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    invoice_id: i64,
    args: UpdateInvoiceArgs,
) -> Result<InvoiceView> {
    ctx.require_admin()?;

    let status = match args.status.as_deref() {
        Some(value) => Some(InvoiceStatus::parse(value).ok_or_else(|| Error::Validation {
            message: format!("invalid invoice status: {value}"),
        })?),
        None => None,
    };
    if let Some(lines) = &args.lines {
        for line in lines {
            if line.quantity < 1 {
                return Err(Error::Validation {
                    message: format!("quantity must be at least 1, got {}", line.quantity),
                });
            }
        }
    }

    let txn = db.begin().await?;

    let found = Invoice::find_by_id(invoice_id)
        .one(&txn)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    let mut new_total = None;
    if let Some(lines) = args.lines {
        // Re-validate every referenced product, then re-freeze the lines at
        // current prices.
        let mut snapshot = Vec::with_capacity(lines.len());
        let mut total = 0.0;
        for line in &lines {
            let resolved = Product::find_by_id(line.product_id)
                .one(&txn)
                .await?
                .ok_or(Error::ProductNotFound {
                    id: line.product_id,
                })?;
            total += resolved.price * line.quantity as f64;
            snapshot.push((resolved, line.quantity));
        }

        InvoiceItem::delete_many()
            .filter(invoice_item::Column::InvoiceId.eq(found.id))
            .exec(&txn)
            .await?;
        for (prod, quantity) in &snapshot {
            invoice_item::ActiveModel {
                invoice_id: Set(found.id),
                product_id: Set(prod.id),
                quantity: Set(*quantity),
                unit_price: Set(prod.price),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        new_total = Some(total);
    }

    if status.is_none() && new_total.is_none() {
        txn.commit().await?;
        return load_view(db, found).await;
    }

    let mut active: invoice::ActiveModel = found.into();
    if let Some(status) = status {
        active.status = Set(status);
    }
    if let Some(total) = new_total {
        active.total = Set(total);
    }
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    load_view(db, updated).await
}

/// Deletes an invoice and restores its snapshot quantities to stock.
/// Administrator only.
///
/// Each line's quantity is added back onto its product atomically; products
/// removed from the catalog since invoicing no longer have a row to
/// restore and are skipped.
///
/// # Errors
/// Returns `Forbidden` for non-admin callers, `InvoiceNotFound` if the
/// invoice is missing.
pub async fn delete_invoice(
    db: &DatabaseConnection,
    ctx: &AuthContext,
    invoice_id: i64,
) -> Result<()> {
    ctx.require_admin()?;

    let txn = db.begin().await?;

    let found = Invoice::find_by_id(invoice_id)
        .one(&txn)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;
    let items = InvoiceItem::find()
        .filter(invoice_item::Column::InvoiceId.eq(found.id))
        .all(&txn)
        .await?;

    for item in &items {
        Product::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).add(item.quantity),
            )
            .filter(product::Column::Id.eq(item.product_id))
            .exec(&txn)
            .await?;
    }

    InvoiceItem::delete_many()
        .filter(invoice_item::Column::InvoiceId.eq(found.id))
        .exec(&txn)
        .await?;
    found.delete(&txn).await?;

    txn.commit().await?;
    info!(invoice_id, "invoice deleted, stock restored");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{cart as cart_ops, catalog};
    use crate::entities::Role;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_checkout_requires_client() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_user(&db, "admin@example.com", Role::Admin).await?;

        let result = checkout(&db, &ctx_for(&admin), None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Forbidden { message: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() -> Result<()> {
        let (db, _cat, prod) = setup_with_product().await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ctx = ctx_for(&user);

        // No cart at all
        let result = checkout(&db, &ctx, None).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyCart));

        // A cart emptied by hand is just as empty
        cart_ops::add_to_cart(&db, &ctx, prod.id, 1).await?;
        cart_ops::remove_from_cart(&db, &ctx, prod.id).await?;
        let result = checkout(&db, &ctx, None).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyCart));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_success() -> Result<()> {
        // Spec example: qty 2 of a stock-5 product
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let prod = create_test_product(&db, "Coffee", 4.5, 5, cat.id).await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ctx = ctx_for(&user);

        cart_ops::add_to_cart(&db, &ctx, prod.id, 2).await?;
        let view = checkout(&db, &ctx, None).await?;

        assert_eq!(view.invoice.user_id, user.id);
        assert_eq!(view.invoice.status, InvoiceStatus::Pending);
        assert_eq!(view.invoice.total, 9.0);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[0].unit_price, 4.5);

        // Stock decremented by the line quantity, not by 1
        assert_eq!(catalog::get_product(&db, prod.id).await?.stock, 3);

        // The cart survives with zero lines
        let cart_view = cart_ops::get_cart(&db, &ctx).await?;
        assert!(cart_view.lines.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_rejects_out_of_stock_product() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let gone = create_test_product(&db, "Gone", 2.0, 1, cat.id).await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ctx = ctx_for(&user);

        cart_ops::add_to_cart(&db, &ctx, gone.id, 1).await?;
        // Sells out between add and checkout
        let mut sold_out: product::ActiveModel =
            catalog::get_product(&db, gone.id).await?.into();
        sold_out.stock = Set(0);
        sold_out.update(&db).await?;

        let result = checkout(&db, &ctx, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductUnavailable { id: _ }
        ));

        // Nothing changed: no invoice, stock still 0, cart untouched
        assert!(Invoice::find().all(&db).await?.is_empty());
        assert_eq!(catalog::get_product(&db, gone.id).await?.stock, 0);
        assert_eq!(cart_ops::get_cart(&db, &ctx).await?.lines.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_product() -> Result<()> {
        let (db, _cat, prod) = setup_with_product().await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ctx = ctx_for(&user);

        cart_ops::add_to_cart(&db, &ctx, prod.id, 1).await?;
        Product::delete_by_id(prod.id).exec(&db).await?;

        let result = checkout(&db, &ctx, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductUnavailable { id: _ }
        ));
        assert!(Invoice::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_is_all_or_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let plenty = create_test_product(&db, "Plenty", 1.0, 10, cat.id).await?;
        let scarce = create_test_product(&db, "Scarce", 1.0, 2, cat.id).await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ctx = ctx_for(&user);

        cart_ops::add_to_cart(&db, &ctx, plenty.id, 1).await?;
        cart_ops::add_to_cart(&db, &ctx, scarce.id, 3).await?;

        let result = checkout(&db, &ctx, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                id: _,
                requested: 3,
                available: 2
            }
        ));

        // The earlier line's decrement rolled back with everything else
        assert_eq!(catalog::get_product(&db, plenty.id).await?.stock, 10);
        assert_eq!(catalog::get_product(&db, scarce.id).await?.stock, 2);
        assert!(Invoice::find().all(&db).await?.is_empty());
        assert!(InvoiceItem::find().all(&db).await?.is_empty());
        assert_eq!(cart_ops::get_cart(&db, &ctx).await?.lines.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_interleaved_checkouts_cannot_oversell() -> Result<()> {
        // Two carts wanting 2 each from a stock of 3: exactly one succeeds
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let prod = create_test_product(&db, "Contested", 1.0, 3, cat.id).await?;
        let ana = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ben = create_test_user(&db, "ben@example.com", Role::Client).await?;

        cart_ops::add_to_cart(&db, &ctx_for(&ana), prod.id, 2).await?;
        cart_ops::add_to_cart(&db, &ctx_for(&ben), prod.id, 2).await?;

        checkout(&db, &ctx_for(&ana), None).await?;
        let result = checkout(&db, &ctx_for(&ben), None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock { .. }
        ));

        let remaining = catalog::get_product(&db, prod.id).await?.stock;
        assert_eq!(remaining, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_idempotency_key() -> Result<()> {
        let (db, _cat, prod) = setup_with_product().await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ctx = ctx_for(&user);

        cart_ops::add_to_cart(&db, &ctx, prod.id, 2).await?;
        let first = checkout(&db, &ctx, Some("order-1".to_string())).await?;

        // The cart is now empty; a blind retry still gets the same invoice
        let retried = checkout(&db, &ctx, Some("order-1".to_string())).await?;
        assert_eq!(retried.invoice.id, first.invoice.id);
        assert_eq!(retried.items.len(), first.items.len());
        assert_eq!(Invoice::find().all(&db).await?.len(), 1);

        // Stock moved exactly once
        assert_eq!(catalog::get_product(&db, prod.id).await?.stock, 8);

        // A new key after new adds creates a new invoice
        cart_ops::add_to_cart(&db, &ctx, prod.id, 1).await?;
        let second = checkout(&db, &ctx, Some("order-2".to_string())).await?;
        assert_ne!(second.invoice.id, first.invoice.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_is_immune_to_product_edits() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let prod = create_test_product(&db, "Coffee", 4.0, 10, cat.id).await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ctx = ctx_for(&user);

        cart_ops::add_to_cart(&db, &ctx, prod.id, 2).await?;
        let view = checkout(&db, &ctx, None).await?;
        assert_eq!(view.invoice.total, 8.0);

        // Reprice the product after checkout
        let mut repriced: product::ActiveModel = catalog::get_product(&db, prod.id).await?.into();
        repriced.price = Set(99.0);
        repriced.update(&db).await?;

        let reread = get_invoice(&db, &ctx, view.invoice.id).await?;
        assert_eq!(reread.invoice.total, 8.0);
        assert_eq!(reread.items[0].unit_price, 4.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_invoice_ownership() -> Result<()> {
        let (db, _cat, prod) = setup_with_product().await?;
        let ana = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ben = create_test_user(&db, "ben@example.com", Role::Client).await?;
        let admin = create_test_user(&db, "admin@example.com", Role::Admin).await?;

        cart_ops::add_to_cart(&db, &ctx_for(&ana), prod.id, 1).await?;
        let view = checkout(&db, &ctx_for(&ana), None).await?;

        // Owner and admin may read it; another client may not
        assert!(get_invoice(&db, &ctx_for(&ana), view.invoice.id).await.is_ok());
        assert!(get_invoice(&db, &ctx_for(&admin), view.invoice.id).await.is_ok());
        let result = get_invoice(&db, &ctx_for(&ben), view.invoice.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Forbidden { message: _ }
        ));

        let result = get_invoice(&db, &ctx_for(&ana), 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvoiceNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_invoices_ownership() -> Result<()> {
        let (db, _cat, prod) = setup_with_product().await?;
        let ana = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let ben = create_test_user(&db, "ben@example.com", Role::Client).await?;
        let admin = create_test_user(&db, "admin@example.com", Role::Admin).await?;

        cart_ops::add_to_cart(&db, &ctx_for(&ana), prod.id, 1).await?;
        checkout(&db, &ctx_for(&ana), None).await?;
        cart_ops::add_to_cart(&db, &ctx_for(&ana), prod.id, 1).await?;
        checkout(&db, &ctx_for(&ana), None).await?;

        assert_eq!(list_invoices(&db, &ctx_for(&ana), ana.id).await?.len(), 2);
        assert_eq!(list_invoices(&db, &ctx_for(&admin), ana.id).await?.len(), 2);

        let result = list_invoices(&db, &ctx_for(&ben), ana.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Forbidden { message: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_invoice_status_and_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let coffee = create_test_product(&db, "Coffee", 4.0, 10, cat.id).await?;
        let tea = create_test_product(&db, "Tea", 2.0, 10, cat.id).await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let admin = create_test_user(&db, "admin@example.com", Role::Admin).await?;

        cart_ops::add_to_cart(&db, &ctx_for(&user), coffee.id, 1).await?;
        let view = checkout(&db, &ctx_for(&user), None).await?;

        // Only admins may update
        let result = update_invoice(
            &db,
            &ctx_for(&user),
            view.invoice.id,
            UpdateInvoiceArgs {
                status: Some("PAID".to_string()),
                lines: None,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Forbidden { message: _ }
        ));

        // Unknown status is rejected before anything is written
        let result = update_invoice(
            &db,
            &ctx_for(&admin),
            view.invoice.id,
            UpdateInvoiceArgs {
                status: Some("SHIPPED".to_string()),
                lines: None,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message: _ }
        ));

        // Status change plus a replacement line list, re-priced and re-totaled
        let updated = update_invoice(
            &db,
            &ctx_for(&admin),
            view.invoice.id,
            UpdateInvoiceArgs {
                status: Some("PAID".to_string()),
                lines: Some(vec![InvoiceLineArgs {
                    product_id: tea.id,
                    quantity: 3,
                }]),
            },
        )
        .await?;
        assert_eq!(updated.invoice.status, InvoiceStatus::Paid);
        assert_eq!(updated.invoice.total, 6.0);
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].product_id, tea.id);
        assert_eq!(updated.items[0].unit_price, 2.0);

        // Replacement lines must reference live products
        let result = update_invoice(
            &db,
            &ctx_for(&admin),
            view.invoice.id,
            UpdateInvoiceArgs {
                status: None,
                lines: Some(vec![InvoiceLineArgs {
                    product_id: 999,
                    quantity: 1,
                }]),
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_invoice_restores_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let prod = create_test_product(&db, "Coffee", 4.0, 5, cat.id).await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let admin = create_test_user(&db, "admin@example.com", Role::Admin).await?;

        cart_ops::add_to_cart(&db, &ctx_for(&user), prod.id, 2).await?;
        let view = checkout(&db, &ctx_for(&user), None).await?;
        assert_eq!(catalog::get_product(&db, prod.id).await?.stock, 3);

        // Clients may not delete invoices
        let result = delete_invoice(&db, &ctx_for(&user), view.invoice.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Forbidden { message: _ }
        ));

        delete_invoice(&db, &ctx_for(&admin), view.invoice.id).await?;
        assert_eq!(catalog::get_product(&db, prod.id).await?.stock, 5);
        assert!(Invoice::find_by_id(view.invoice.id).one(&db).await?.is_none());
        assert!(InvoiceItem::find().all(&db).await?.is_empty());

        let result = delete_invoice(&db, &ctx_for(&admin), view.invoice.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvoiceNotFound { id: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_best_selling_is_derived_from_invoices() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "General").await?;
        let coffee = create_test_product(&db, "Coffee", 4.0, 20, cat.id).await?;
        let tea = create_test_product(&db, "Tea", 2.0, 20, cat.id).await?;
        let cocoa = create_test_product(&db, "Cocoa", 3.0, 20, cat.id).await?;
        let user = create_test_user(&db, "ana@example.com", Role::Client).await?;
        let admin = create_test_user(&db, "admin@example.com", Role::Admin).await?;
        let ctx = ctx_for(&user);

        cart_ops::add_to_cart(&db, &ctx, coffee.id, 5).await?;
        cart_ops::add_to_cart(&db, &ctx, tea.id, 1).await?;
        checkout(&db, &ctx, None).await?;
        cart_ops::add_to_cart(&db, &ctx, coffee.id, 2).await?;
        checkout(&db, &ctx, None).await?;

        let ranked = catalog::best_selling(&db, &ctx_for(&admin), 2).await?;
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product.id, coffee.id);
        assert_eq!(ranked[0].units_sold, 7);
        assert_eq!(ranked[1].product.id, tea.id);
        assert_eq!(ranked[1].units_sold, 1);

        // Never-sold products rank last with zero
        let all = catalog::best_selling(&db, &ctx_for(&admin), 10).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].product.id, cocoa.id);
        assert_eq!(all[2].units_sold, 0);

        let result = catalog::best_selling(&db, &ctx, 5).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Forbidden { message: _ }
        ));
        Ok(())
    }
}
