//! Instrument selection for new entries
//!
//! The policy is chosen by configuration: always the same instrument, or a
//! random pick among favorites the venue reports as tradable shares.

use async_trait::async_trait;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tradecycle_core::InstrumentId;
use tradecycle_ports::{VenueError, VenueGateway};

use crate::error::{Error, Result};

/// Chooses which instrument the next entry buys
#[async_trait]
pub trait PositionSelector: Send + Sync {
    async fn choose_instrument(&self, venue: &dyn VenueGateway) -> Result<InstrumentId>;

    fn name(&self) -> &str;
}

/// Always the configured instrument
#[derive(Debug, Clone)]
pub struct FixedInstrument {
    instrument_id: InstrumentId,
}

impl FixedInstrument {
    pub fn new(instrument_id: InstrumentId) -> Self {
        Self { instrument_id }
    }
}

#[async_trait]
impl PositionSelector for FixedInstrument {
    async fn choose_instrument(&self, _venue: &dyn VenueGateway) -> Result<InstrumentId> {
        Ok(self.instrument_id.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Random pick among favorites that are tradable shares
pub struct RandomFavorite {
    favorites: Vec<InstrumentId>,
    rng: Mutex<StdRng>,
}

impl RandomFavorite {
    pub fn new(favorites: Vec<InstrumentId>) -> Self {
        Self {
            favorites,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible picks
    pub fn with_seed(favorites: Vec<InstrumentId>, seed: u64) -> Self {
        Self {
            favorites,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Favorites the venue lists as shares open to API trading
    async fn candidates(&self, venue: &dyn VenueGateway) -> Result<Vec<InstrumentId>> {
        let mut candidates = Vec::with_capacity(self.favorites.len());
        for id in &self.favorites {
            match venue.get_instrument_metadata(id).await {
                Ok(instrument) if instrument.is_tradable_share() => candidates.push(instrument.id),
                Ok(instrument) => {
                    info!(
                        "[SELECTOR] skipping {}: {:?}, api trading {}",
                        id, instrument.kind, instrument.api_trade_available
                    );
                }
                Err(VenueError::NotFound(_)) => {
                    warn!("[SELECTOR] favorite {} not found on venue", id)
                }
                Err(e) => return Err(Error::venue(e, Some(id), None)),
            }
        }
        Ok(candidates)
    }
}

#[async_trait]
impl PositionSelector for RandomFavorite {
    async fn choose_instrument(&self, venue: &dyn VenueGateway) -> Result<InstrumentId> {
        let candidates = self.candidates(venue).await?;
        let chosen = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            candidates.choose(&mut *rng).cloned()
        }
        .ok_or(Error::NoTradableInstrument {
            candidates: self.favorites.len(),
        })?;
        info!(
            "[SELECTOR] chose {} among {} tradable favorites",
            chosen,
            candidates.len()
        );
        Ok(chosen)
    }

    fn name(&self) -> &str {
        "random_favorite"
    }
}

/// Selection policy as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case", deny_unknown_fields)]
pub enum SelectionPolicy {
    Fixed { instrument_id: InstrumentId },
    RandomFavorite { favorites: Vec<InstrumentId> },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::Fixed {
            instrument_id: InstrumentId::new("10e17a87-3bce-4a1f-9dfc-720396f98a3c"),
        }
    }
}

impl SelectionPolicy {
    /// Every instrument the policy may choose
    pub fn instrument_ids(&self) -> Vec<InstrumentId> {
        match self {
            SelectionPolicy::Fixed { instrument_id } => vec![instrument_id.clone()],
            SelectionPolicy::RandomFavorite { favorites } => favorites.clone(),
        }
    }

    pub fn build(&self) -> Box<dyn PositionSelector> {
        match self {
            SelectionPolicy::Fixed { instrument_id } => {
                Box::new(FixedInstrument::new(instrument_id.clone()))
            }
            SelectionPolicy::RandomFavorite { favorites } => {
                Box::new(RandomFavorite::new(favorites.clone()))
            }
        }
    }
}
