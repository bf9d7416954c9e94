//! Offer repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Offers reference their target polymorphically (`target_kind`, `target_id`);
//!   target existence is checked by the service layer.
//! - Listing by target returns newest offers first.

use crate::model::menu::{CategoryId, ItemId};
use crate::model::money::Money;
use crate::model::offer::{Discount, Offer, OfferId, OfferTarget};
use crate::repo::shared::{
    bool_to_int, check_row, ensure_tables, parse_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const OFFER_SELECT_SQL: &str = "SELECT
    id,
    target_kind,
    target_id,
    discount_kind,
    discount_value,
    title,
    is_active
FROM offers";

/// Repository interface for pricing offers.
pub trait OfferRepository {
    fn create_offer(&self, offer: &Offer) -> RepoResult<OfferId>;
    fn list_offers_for_item(&self, item_id: ItemId, active_only: bool) -> RepoResult<Vec<Offer>>;
    fn list_offers_for_category(
        &self,
        category_id: CategoryId,
        active_only: bool,
    ) -> RepoResult<Vec<Offer>>;
    fn set_offer_active(&self, offer_id: OfferId, is_active: bool) -> RepoResult<()>;
}

/// SQLite-backed offer repository.
pub struct SqliteOfferRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOfferRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["offers"])?;
        Ok(Self { conn })
    }

    fn list_for_target(&self, target: OfferTarget, active_only: bool) -> RepoResult<Vec<Offer>> {
        let (kind, id) = target_to_db(target);
        let mut stmt = self.conn.prepare(&format!(
            "{OFFER_SELECT_SQL}
             WHERE target_kind = ?1
               AND target_id = ?2
               AND (?3 = 0 OR is_active = 1)
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query(params![kind, id, bool_to_int(active_only)])?;
        let mut offers = Vec::new();
        while let Some(row) = rows.next()? {
            offers.push(parse_offer_row(row)?);
        }
        Ok(offers)
    }
}

impl OfferRepository for SqliteOfferRepository<'_> {
    fn create_offer(&self, offer: &Offer) -> RepoResult<OfferId> {
        offer.validate()?;

        let (target_kind, target_id) = target_to_db(offer.target);
        let (discount_kind, discount_value) = discount_to_db(offer.discount);
        self.conn.execute(
            "INSERT INTO offers (
                id,
                target_kind,
                target_id,
                discount_kind,
                discount_value,
                title,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                offer.id.to_string(),
                target_kind,
                target_id,
                discount_kind,
                discount_value,
                offer.title.trim(),
                bool_to_int(offer.is_active),
            ],
        )?;

        Ok(offer.id)
    }

    fn list_offers_for_item(&self, item_id: ItemId, active_only: bool) -> RepoResult<Vec<Offer>> {
        self.list_for_target(OfferTarget::Item(item_id), active_only)
    }

    fn list_offers_for_category(
        &self,
        category_id: CategoryId,
        active_only: bool,
    ) -> RepoResult<Vec<Offer>> {
        self.list_for_target(OfferTarget::Category(category_id), active_only)
    }

    fn set_offer_active(&self, offer_id: OfferId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE offers SET is_active = ?2 WHERE id = ?1;",
            params![offer_id.to_string(), bool_to_int(is_active)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "offer",
                id: offer_id,
            });
        }
        Ok(())
    }
}

fn parse_offer_row(row: &Row<'_>) -> RepoResult<Offer> {
    let id_text: String = row.get("id")?;
    let target_kind: String = row.get("target_kind")?;
    let target_id_text: String = row.get("target_id")?;
    let target_id = parse_uuid(&target_id_text, "offers.target_id")?;
    let target = match target_kind.as_str() {
        "item" => OfferTarget::Item(target_id),
        "category" => OfferTarget::Category(target_id),
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid target kind `{other}` in offers.target_kind"
            )));
        }
    };

    let discount_kind: String = row.get("discount_kind")?;
    let discount_value: i64 = row.get("discount_value")?;
    let discount = match discount_kind.as_str() {
        "percent" => Discount::Percent(u8::try_from(discount_value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid percent `{discount_value}` in offers.discount_value"
            ))
        })?),
        "flat" => Discount::Flat(Money::from_cents(discount_value)),
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid discount kind `{other}` in offers.discount_kind"
            )));
        }
    };

    let offer = Offer {
        id: parse_uuid(&id_text, "offers.id")?,
        target,
        discount,
        title: row.get("title")?,
        is_active: parse_bool(row.get("is_active")?, "offers.is_active")?,
    };
    check_row(offer.validate(), "offers")?;
    Ok(offer)
}

fn target_to_db(target: OfferTarget) -> (&'static str, String) {
    match target {
        OfferTarget::Item(id) => ("item", id.to_string()),
        OfferTarget::Category(id) => ("category", id.to_string()),
    }
}

fn discount_to_db(discount: Discount) -> (&'static str, i64) {
    match discount {
        Discount::Percent(pct) => ("percent", i64::from(pct)),
        Discount::Flat(amount) => ("flat", amount.cents()),
    }
}
