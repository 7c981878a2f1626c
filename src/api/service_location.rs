use serde_json::Value;

use super::{Aggregation, TimeRange, Timestamp};
use crate::{ApiClient, Error, Result};

/// Endpoints living under `/servicelocation`.
///
/// Bodies are handed back as raw JSON, their layout is Smappee's business.
pub struct ServiceLocations<'a> {
    client: &'a mut dyn ApiClient,
}

impl<'a> ServiceLocations<'a> {
    pub fn new(client: &'a mut dyn ApiClient) -> Self {
        Self { client }
    }

    /// All service locations the authenticated user has access to
    pub fn list(&mut self) -> Result<Value> {
        self.client.http_get("", &[])
    }

    pub fn info(&mut self, service_location_id: u64) -> Result<Value> {
        let path = format!("/{}/info", service_location_id);
        self.client.http_get(&path, &[])
    }

    /// Consumption between `start` and `end`, bucketed by `aggregation`
    pub fn consumption(
        &mut self,
        service_location_id: u64,
        start: Timestamp,
        end: Timestamp,
        aggregation: Aggregation,
    ) -> Result<Value> {
        let mut qs: Vec<(String, String)> = vec![];

        qs.push(("aggregation".to_string(), aggregation.to_string()));
        qs.append(&mut TimeRange { start, end }.to_query_string());

        let path = format!("/{}/consumption", service_location_id);
        self.client.http_get(&path, &qs)
    }

    /// Events of one appliance. Without `max_number` the server returns every event in
    /// the period.
    pub fn events(
        &mut self,
        service_location_id: u64,
        appliance_id: u64,
        start: Timestamp,
        end: Timestamp,
        max_number: Option<u32>,
    ) -> Result<Value> {
        let mut qs = TimeRange { start, end }.to_query_string();

        qs.push(("applianceId".to_string(), appliance_id.to_string()));
        if let Some(max_number) = max_number {
            qs.push(("maxNumber".to_string(), max_number.to_string()));
        }

        let path = format!("/{}/events", service_location_id);
        self.client.http_get(&path, &qs)
    }

    pub fn actuator_on(&mut self) -> Result<Value> {
        Err(Error::NotImplemented("actuator_on"))
    }

    pub fn actuator_off(&mut self) -> Result<Value> {
        Err(Error::NotImplemented("actuator_off"))
    }
}
