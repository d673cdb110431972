//! Alert persistence.
//!
//! [`AlertStore`] is the interface the engine and the HTTP layer consume;
//! the persistence technology behind it is interchangeable. The in-memory
//! [`MemoryAlertStore`] is the reference implementation. Alerts are never
//! hard-deleted: deletion clears `is_active`, and inactive alerts are
//! invisible to every read path.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{AlertError, Result};
use crate::types::{Alert, AlertSpec};

/// CRUD plus the "all active alerts" query the engine needs.
pub trait AlertStore: Send + Sync {
    /// Creates an alert from a spec.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Validation`] for a bad spec and
    /// [`AlertError::Duplicate`] when an active alert with the identical
    /// spec tuple exists.
    fn create(&self, spec: AlertSpec) -> Result<Alert>;

    /// Returns every active alert.
    fn find_active(&self) -> Vec<Alert>;

    /// Returns the active alert with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotFound`] when absent or inactive.
    fn find_active_by_id(&self, id: Uuid) -> Result<Alert>;

    /// Upserts an alert, overwriting its evaluation-state fields.
    fn save(&self, alert: &Alert) -> Result<()>;

    /// Soft-deletes an alert by clearing `is_active`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotFound`] when absent or already inactive.
    fn soft_delete(&self, id: Uuid) -> Result<()>;
}

/// In-memory alert store.
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    alerts: RwLock<HashMap<Uuid, Alert>>,
}

impl MemoryAlertStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    /// Returns true when the store holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}

impl AlertStore for MemoryAlertStore {
    fn create(&self, spec: AlertSpec) -> Result<Alert> {
        spec.validate()?;

        let mut alerts = self.alerts.write();
        let duplicate = alerts
            .values()
            .any(|a| a.is_active && a.spec.matches_spec(&spec));
        if duplicate {
            return Err(AlertError::Duplicate);
        }

        let alert = Alert::from_spec(spec, Utc::now());
        info!(
            alert_id = %alert.id,
            city = %alert.spec.city,
            parameter = %alert.spec.parameter,
            condition = %alert.spec.condition,
            "created alert"
        );
        alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    fn find_active(&self) -> Vec<Alert> {
        let mut active: Vec<Alert> = self
            .alerts
            .read()
            .values()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active
    }

    fn find_active_by_id(&self, id: Uuid) -> Result<Alert> {
        self.alerts
            .read()
            .get(&id)
            .filter(|a| a.is_active)
            .cloned()
            .ok_or(AlertError::NotFound { id })
    }

    fn save(&self, alert: &Alert) -> Result<()> {
        let mut stored = alert.clone();
        stored.updated_at = Utc::now();
        self.alerts.write().insert(stored.id, stored);
        Ok(())
    }

    fn soft_delete(&self, id: Uuid) -> Result<()> {
        let mut alerts = self.alerts.write();
        let alert = alerts
            .get_mut(&id)
            .filter(|a| a.is_active)
            .ok_or(AlertError::NotFound { id })?;

        alert.is_active = false;
        alert.updated_at = Utc::now();
        info!(alert_id = %id, "soft-deleted alert");
        Ok(())
    }
}

impl<S: AlertStore> AlertStore for std::sync::Arc<S> {
    fn create(&self, spec: AlertSpec) -> Result<Alert> {
        self.as_ref().create(spec)
    }

    fn find_active(&self) -> Vec<Alert> {
        self.as_ref().find_active()
    }

    fn find_active_by_id(&self, id: Uuid) -> Result<Alert> {
        self.as_ref().find_active_by_id(id)
    }

    fn save(&self, alert: &Alert) -> Result<()> {
        self.as_ref().save(alert)
    }

    fn soft_delete(&self, id: Uuid) -> Result<()> {
        self.as_ref().soft_delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConditionKind;
    use nimbus_weather::WeatherParameter;

    fn spec() -> AlertSpec {
        AlertSpec {
            city: "Berlin".to_string(),
            parameter: WeatherParameter::Temperature,
            condition: ConditionKind::Above,
            threshold_min: 30.0,
            threshold_max: None,
            email: None,
        }
    }

    #[test]
    fn create_and_find() {
        let store = MemoryAlertStore::new();
        let created = store.create(spec());
        assert!(created.is_ok());
        let created = created.unwrap();

        let found = store.find_active_by_id(created.id);
        assert!(found.is_ok());
        assert_eq!(found.unwrap().spec.city, "Berlin");
        assert_eq!(store.find_active().len(), 1);
    }

    #[test]
    fn create_rejects_invalid_spec() {
        let store = MemoryAlertStore::new();
        let mut bad = spec();
        bad.threshold_min = 100.0; // outside temperature range
        assert!(matches!(
            store.create(bad),
            Err(AlertError::Validation { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn create_rejects_duplicate_tuple() {
        let store = MemoryAlertStore::new();
        store.create(spec()).unwrap();

        let result = store.create(spec());
        assert!(matches!(result, Err(AlertError::Duplicate)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_allowed_after_soft_delete() {
        let store = MemoryAlertStore::new();
        let first = store.create(spec()).unwrap();
        store.soft_delete(first.id).unwrap();

        // inactive alerts do not participate in duplicate detection
        assert!(store.create(spec()).is_ok());
    }

    #[test]
    fn different_email_is_not_a_duplicate() {
        let store = MemoryAlertStore::new();
        store.create(spec()).unwrap();

        let mut other = spec();
        other.email = Some("user@example.com".to_string());
        assert!(store.create(other).is_ok());
    }

    #[test]
    fn find_active_excludes_deleted() {
        let store = MemoryAlertStore::new();
        let alert = store.create(spec()).unwrap();
        store.soft_delete(alert.id).unwrap();

        assert!(store.find_active().is_empty());
        assert!(matches!(
            store.find_active_by_id(alert.id),
            Err(AlertError::NotFound { .. })
        ));
        // record still physically present
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn soft_delete_unknown_id_fails() {
        let store = MemoryAlertStore::new();
        assert!(matches!(
            store.soft_delete(Uuid::new_v4()),
            Err(AlertError::NotFound { .. })
        ));
    }

    #[test]
    fn soft_delete_twice_fails_the_second_time() {
        let store = MemoryAlertStore::new();
        let alert = store.create(spec()).unwrap();

        assert!(store.soft_delete(alert.id).is_ok());
        assert!(matches!(
            store.soft_delete(alert.id),
            Err(AlertError::NotFound { .. })
        ));
    }

    #[test]
    fn save_overwrites_evaluation_state() {
        let store = MemoryAlertStore::new();
        let mut alert = store.create(spec()).unwrap();

        alert.current_value = Some(32.0);
        alert.last_checked = Some(Utc::now());
        store.save(&alert).unwrap();

        let reloaded = store.find_active_by_id(alert.id).unwrap();
        assert_eq!(reloaded.current_value, Some(32.0));
        assert!(reloaded.last_checked.is_some());
        assert!(reloaded.updated_at >= alert.updated_at);
    }

    #[test]
    fn find_active_orders_newest_first() {
        let store = MemoryAlertStore::new();
        let first = store.create(spec()).unwrap();

        let mut second_spec = spec();
        second_spec.city = "Lisbon".to_string();
        // created_at resolution is fine-grained enough in practice, but make
        // the ordering unambiguous for the test
        let mut second = Alert::from_spec(second_spec, first.created_at + chrono::Duration::seconds(1));
        second.is_active = true;
        store.save(&second).unwrap();

        let active = store.find_active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].spec.city, "Lisbon");
    }
}
