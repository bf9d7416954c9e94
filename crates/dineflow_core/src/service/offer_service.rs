//! Offer admin use-cases and price book resolution.
//!
//! # Invariants
//! - Offers can only target items or categories that exist.
//! - Each item takes the single active offer with the largest discount; offers
//!   never stack.

use crate::cart::pricing::{PriceBook, UnitPrice};
use crate::model::menu::{CategoryId, ItemId, MenuItem};
use crate::model::offer::{Discount, Offer, OfferId, OfferTarget};
use crate::model::validation::ValidationError;
use crate::repo::menu_repo::{MenuRepository, SqliteMenuRepository};
use crate::repo::offer_repo::{OfferRepository, SqliteOfferRepository};
use crate::repo::shared::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum OfferServiceError {
    TargetNotFound(OfferTarget),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for OfferServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetNotFound(OfferTarget::Item(id)) => {
                write!(f, "offer target item not found: {id}")
            }
            Self::TargetNotFound(OfferTarget::Category(id)) => {
                write!(f, "offer target category not found: {id}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OfferServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TargetNotFound(_) => None,
        }
    }
}

impl From<RepoError> for OfferServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Offer service facade over offer and menu repositories.
pub struct OfferService<O: OfferRepository, M: MenuRepository> {
    offers: O,
    menus: M,
}

pub type SqliteOfferService<'conn> =
    OfferService<SqliteOfferRepository<'conn>, SqliteMenuRepository<'conn>>;

impl<'conn> SqliteOfferService<'conn> {
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteOfferRepository::try_new(conn)?,
            SqliteMenuRepository::try_new(conn)?,
        ))
    }
}

impl<O: OfferRepository, M: MenuRepository> OfferService<O, M> {
    pub fn new(offers: O, menus: M) -> Self {
        Self { offers, menus }
    }

    /// Creates an active offer after checking that its target exists.
    pub fn create_offer(
        &self,
        target: OfferTarget,
        discount: Discount,
        title: impl Into<String>,
    ) -> Result<Offer, OfferServiceError> {
        discount.validate().map_err(OfferServiceError::Validation)?;

        let exists = match target {
            OfferTarget::Item(id) => self.menus.get_item(id)?.is_some(),
            OfferTarget::Category(id) => self.menus.get_category(id)?.is_some(),
        };
        if !exists {
            return Err(OfferServiceError::TargetNotFound(target));
        }

        let offer = Offer::new(target, discount, title.into().trim());
        let offer_id = self.offers.create_offer(&offer)?;
        info!("event=offer_create module=service status=ok offer_id={offer_id}");
        Ok(offer)
    }

    pub fn offers_for_item(
        &self,
        item_id: ItemId,
        active_only: bool,
    ) -> Result<Vec<Offer>, OfferServiceError> {
        Ok(self.offers.list_offers_for_item(item_id, active_only)?)
    }

    pub fn offers_for_category(
        &self,
        category_id: CategoryId,
        active_only: bool,
    ) -> Result<Vec<Offer>, OfferServiceError> {
        Ok(self.offers.list_offers_for_category(category_id, active_only)?)
    }

    /// Pauses or resumes an offer without deleting it.
    pub fn set_active(&self, offer_id: OfferId, is_active: bool) -> Result<(), OfferServiceError> {
        self.offers.set_offer_active(offer_id, is_active)?;
        info!(
            "event=offer_set_active module=service status=ok offer_id={offer_id} active={is_active}"
        );
        Ok(())
    }

    /// Resolves list price and best active discount for each item.
    pub fn price_book(&self, items: &[MenuItem]) -> Result<PriceBook, OfferServiceError> {
        Ok(build_price_book(&self.offers, items)?)
    }
}

/// Builds a price book from `items`, reading active offers from `offers`.
pub fn build_price_book<O: OfferRepository>(
    offers: &O,
    items: &[MenuItem],
) -> RepoResult<PriceBook> {
    let mut book = PriceBook::with_capacity(items.len());
    for item in items {
        let mut candidates = offers.list_offers_for_item(item.id, true)?;
        candidates.extend(offers.list_offers_for_category(item.category_id, true)?);

        let discount = candidates
            .iter()
            .map(|offer| offer.discount.amount_off(item.price))
            .max()
            .unwrap_or_default();
        book.insert(
            item.id,
            UnitPrice {
                list: item.price,
                discount,
            },
        );
    }
    Ok(book)
}
