//! Banned addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{ServiceError, StoreError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanlistEntry {
    pub ip: String,
    /// Who added the entry.
    pub user: String,
    pub added: DateTime<Utc>,
}

/// Storage for banlist entries.
pub trait BanlistStore {
    fn find_all(&self) -> Result<Vec<BanlistEntry>, StoreError>;
    fn insert(&mut self, entry: BanlistEntry) -> Result<(), StoreError>;
    /// Remove the entry for `ip`, returning whether one existed.
    fn remove(&mut self, ip: &str) -> Result<bool, StoreError>;
}

pub struct BanlistService<S: BanlistStore> {
    store: S,
}

impl<S: BanlistStore> BanlistService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Every entry, oldest first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Fetch`] if the store fails.
    pub fn get_banlist(&self) -> Result<Vec<BanlistEntry>, ServiceError> {
        let mut entries = self.store.find_all().map_err(|err| {
            error!(%err, "failed to fetch banlist");
            ServiceError::Fetch(err)
        })?;
        entries.sort_by_key(|entry| entry.added);
        Ok(entries)
    }

    /// # Errors
    ///
    /// [`ServiceError::Fetch`] if the store fails.
    pub fn is_banned(&self, ip: &str) -> Result<bool, ServiceError> {
        Ok(self.get_banlist()?.iter().any(|entry| entry.ip == ip))
    }

    /// Ban `ip`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::AlreadyBanned`] for duplicates, otherwise the
    /// wrapped store error.
    pub fn add_entry(&mut self, ip: &str, user: &str, now: DateTime<Utc>) -> Result<BanlistEntry, ServiceError> {
        if self.is_banned(ip)? {
            return Err(ServiceError::AlreadyBanned(ip.to_string()));
        }
        let entry = BanlistEntry {
            ip: ip.to_string(),
            user: user.to_string(),
            added: now,
        };
        self.store.insert(entry.clone()).map_err(|err| {
            error!(%err, ip, "failed to save banlist entry");
            ServiceError::Save(err)
        })?;
        info!(ip, user, "address banned");
        Ok(entry)
    }

    /// Lift the ban on `ip`, returning whether it was banned.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Remove`] if the store fails.
    pub fn delete_entry(&mut self, ip: &str) -> Result<bool, ServiceError> {
        let removed = self.store.remove(ip).map_err(|err| {
            error!(%err, ip, "failed to remove banlist entry");
            ServiceError::Remove(err)
        })?;
        if removed {
            info!(ip, "ban lifted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        entries: Vec<BanlistEntry>,
        broken: bool,
    }

    impl BanlistStore for MemoryStore {
        fn find_all(&self) -> Result<Vec<BanlistEntry>, StoreError> {
            if self.broken {
                return Err("connection refused".into());
            }
            Ok(self.entries.clone())
        }

        fn insert(&mut self, entry: BanlistEntry) -> Result<(), StoreError> {
            self.entries.push(entry);
            Ok(())
        }

        fn remove(&mut self, ip: &str) -> Result<bool, StoreError> {
            let before = self.entries.len();
            self.entries.retain(|entry| entry.ip != ip);
            Ok(self.entries.len() != before)
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_add_and_remove() {
        let mut service = BanlistService::new(MemoryStore::default());
        service.add_entry("10.0.0.2", "admin", at(20)).unwrap();
        service.add_entry("10.0.0.1", "admin", at(10)).unwrap();

        let ips: Vec<_> = service.get_banlist().unwrap().into_iter().map(|entry| entry.ip).collect();
        assert_eq!(ips, vec!["10.0.0.1", "10.0.0.2"]);

        assert!(service.delete_entry("10.0.0.1").unwrap());
        assert!(!service.delete_entry("10.0.0.1").unwrap());
        assert!(!service.is_banned("10.0.0.1").unwrap());
    }

    #[test]
    fn test_duplicate_ban() {
        let mut service = BanlistService::new(MemoryStore::default());
        service.add_entry("10.0.0.1", "admin", at(0)).unwrap();
        assert!(matches!(
            service.add_entry("10.0.0.1", "admin", at(1)),
            Err(ServiceError::AlreadyBanned(_))
        ));
    }

    #[test]
    fn test_store_failure_is_wrapped() {
        let service = BanlistService::new(MemoryStore {
            broken: true,
            ..MemoryStore::default()
        });
        let err = service.get_banlist().unwrap_err();
        assert_eq!(err.to_string(), "Error occured fetching banlist");
        assert!(matches!(err, ServiceError::Fetch(_)));
    }
}
