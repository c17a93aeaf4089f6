//! Party directory: lookup, find-or-create and manual edits of parties.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use billing_core::query::contains_ignore_case;
use billing_core::requests::{CreatePartyRequest, UpdatePartyRequest};
use billing_core::validation::validate_balance;
use billing_core::{BalanceOperation, Money, Party};

use crate::balance::BalanceAdjuster;
use crate::error::{LedgerError, LedgerResult};
use crate::store::{PartyStore, StoreError};

const PARTY_KEY: &str = "name+phoneNumber";

pub struct PartyDirectory<S> {
    store: Arc<S>,
    balance: BalanceAdjuster<S>,
}

impl<S> Clone for PartyDirectory<S> {
    fn clone(&self) -> Self {
        PartyDirectory {
            store: Arc::clone(&self.store),
            balance: self.balance.clone(),
        }
    }
}

impl<S: PartyStore> PartyDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        PartyDirectory {
            balance: BalanceAdjuster::new(Arc::clone(&store)),
            store,
        }
    }

    /// Returns the party with exactly this name and phone, creating it with a
    /// zero balance if there is none.
    ///
    /// A concurrent creator winning the insert is not an error: the party it
    /// created is returned.
    pub async fn find_or_create(&self, name: &str, phone_number: &str) -> LedgerResult<Party> {
        if let Some(party) = self.store.find_party_by_key(name, phone_number).await? {
            return Ok(party);
        }

        let party = Party::new(name, phone_number);
        match self.store.insert_party(&party).await {
            Ok(()) => {
                info!(party_id = %party.id, name = %name, "Party created on first reference");
                Ok(party)
            }
            Err(StoreError::Duplicate { .. }) => self
                .store
                .find_party_by_key(name, phone_number)
                .await?
                .ok_or_else(|| LedgerError::conflict(PARTY_KEY, format!("{name} / {phone_number}"))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create(&self, request: CreatePartyRequest) -> LedgerResult<Party> {
        request.validate()?;

        let name = request.name.trim();
        if self
            .store
            .find_party_by_key(name, &request.phone_number)
            .await?
            .is_some()
        {
            return Err(LedgerError::conflict(
                PARTY_KEY,
                format!("{name} / {}", request.phone_number),
            ));
        }

        let mut party = Party::new(name, request.phone_number.as_str());
        party.address = request.address;
        party.email = request.email;
        self.store.insert_party(&party).await?;

        info!(party_id = %party.id, "Party created");
        Ok(party)
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Party> {
        self.store
            .get_party(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Party", id))
    }

    /// Parties whose name or phone contains `query`, sorted by name.
    pub async fn list(&self, query: Option<&str>) -> LedgerResult<Vec<Party>> {
        let query = query.unwrap_or("").trim();
        let mut parties: Vec<Party> = self
            .store
            .list_parties()
            .await?
            .into_iter()
            .filter(|p| contains_ignore_case(&p.name, query) || p.phone_number.contains(query))
            .collect();
        parties.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(parties)
    }

    /// Edits contact details. Documents keep their denormalized copies.
    pub async fn update(&self, id: &str, request: UpdatePartyRequest) -> LedgerResult<Party> {
        request.validate()?;
        let mut party = self.get(id).await?;

        let name = request
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| party.name.clone());
        let phone_number = request
            .phone_number
            .unwrap_or_else(|| party.phone_number.clone());

        if !party.has_key(&name, &phone_number) {
            if let Some(other) = self.store.find_party_by_key(&name, &phone_number).await? {
                if other.id != party.id {
                    return Err(LedgerError::conflict(
                        PARTY_KEY,
                        format!("{name} / {phone_number}"),
                    ));
                }
            }
        }

        party.name = name;
        party.phone_number = phone_number;
        if let Some(address) = request.address {
            party.address = Some(address);
        }
        if let Some(email) = request.email {
            party.email = Some(email);
        }
        party.updated_at = Utc::now();
        self.store.update_party(&party).await?;

        debug!(party_id = %party.id, "Party updated");
        Ok(party)
    }

    /// Manual balance correction.
    pub async fn set_balance(&self, id: &str, balance: Money) -> LedgerResult<Party> {
        validate_balance("balance", balance)?;
        let party = self
            .balance
            .update_balance(id, balance, BalanceOperation::Set)
            .await?;
        info!(party_id = %id, balance = %balance, "Party balance set manually");
        Ok(party)
    }
}
