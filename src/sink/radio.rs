//! Forwarding of one record field over the mesh radio.

use super::{Delivery, RecordSink, SinkError};
use crate::radio::{Endpoint, RadioError, RadioLink};
use crate::record::ClassifiedRecord;
use tracing::{debug, warn};

/// Node identifier of the collecting station.
pub const DEFAULT_REMOTE_NODE_ID: &str = "Main";

/// Record position forwarded by default: the second sensor value.
pub const DEFAULT_FORWARD_FIELD: usize = 2;

/// Relays a fixed record position to a remote radio node.
#[derive(Debug)]
pub struct RadioForwarder<R: RadioLink> {
    radio: R,
    endpoint: Endpoint,
    field_index: usize,
    sent: u64,
}

impl<R: RadioLink> RadioForwarder<R> {
    /// Resolve `node_id` once and forward `field_index` of every record to it.
    pub fn connect(mut radio: R, node_id: &str, field_index: usize) -> Result<Self, RadioError> {
        let endpoint = radio.discover(node_id)?;
        Ok(Self {
            radio,
            endpoint,
            field_index,
            sent: 0,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Send one value to the endpoint, unmodified.
    pub fn forward(&mut self, value: &str) -> Result<(), RadioError> {
        self.radio.send(&self.endpoint, value.as_bytes())?;
        self.sent += 1;
        Ok(())
    }
}

impl<R: RadioLink> RecordSink for RadioForwarder<R> {
    fn name(&self) -> &str {
        "radio"
    }

    fn deliver(&mut self, record: &ClassifiedRecord) -> Result<Delivery, SinkError> {
        let Some(value) = record.record().field(self.field_index) else {
            let reason = format!(
                "record has {} field(s), no field {}",
                record.record().len(),
                self.field_index
            );
            warn!("Not forwarding: {}", reason);
            return Ok(Delivery::Skipped { reason });
        };

        let value = value.to_string();
        self.forward(&value)?;
        debug!("Forwarded '{}' to {}", value, self.endpoint);
        Ok(Delivery::Sent { bytes: value.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortError;
    use crate::radio::MockRadioLink;
    use crate::record::{classify, Record};

    fn main_endpoint() -> Endpoint {
        Endpoint {
            node_id: "Main".to_string(),
            address64: 0x0013_A200_0000_0001,
            address16: 0xFFFE,
        }
    }

    fn discovering_radio() -> MockRadioLink {
        let mut radio = MockRadioLink::new();
        radio
            .expect_discover()
            .withf(|node| node == "Main")
            .times(1)
            .returning(|_| Ok(main_endpoint()));
        radio
    }

    #[test]
    fn test_forwards_second_sensor_value() {
        let mut radio = discovering_radio();
        radio
            .expect_send()
            .withf(|endpoint, data| endpoint.node_id == "Main" && data == b"45.6")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut sink = RadioForwarder::connect(radio, "Main", DEFAULT_FORWARD_FIELD).unwrap();
        let record = classify(Record::new("1000.00", ["12.3", "45.6", "ERR2"]));

        assert_eq!(sink.deliver(&record).unwrap(), Delivery::Sent { bytes: 4 });
        assert_eq!(sink.sent(), 1);
    }

    #[test]
    fn test_fault_token_in_forwarded_position_is_sent_verbatim() {
        let mut radio = discovering_radio();
        radio
            .expect_send()
            .withf(|_, data| data == b"ERR3")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut sink = RadioForwarder::connect(radio, "Main", 2).unwrap();
        let record = classify(Record::new("1.00", ["1.0", "ERR3"]));
        sink.deliver(&record).unwrap();
    }

    #[test]
    fn test_short_record_is_skipped_not_sent() {
        let mut radio = discovering_radio();
        radio.expect_send().times(0);

        let mut sink = RadioForwarder::connect(radio, "Main", 2).unwrap();
        let record = classify(Record::new("1.00", ["12.3"]));

        assert!(matches!(
            sink.deliver(&record).unwrap(),
            Delivery::Skipped { .. }
        ));
        assert_eq!(sink.sent(), 0);
    }

    #[test]
    fn test_send_failure_propagates() {
        let mut radio = discovering_radio();
        radio
            .expect_send()
            .returning(|_, _| Err(RadioError::Port(PortError::NotOpen)));

        let mut sink = RadioForwarder::connect(radio, "Main", 2).unwrap();
        let record = classify(Record::new("1.00", ["1", "2"]));
        assert!(matches!(sink.deliver(&record), Err(SinkError::Radio(_))));
    }

    #[test]
    fn test_discovery_failure_prevents_construction() {
        let mut radio = MockRadioLink::new();
        radio.expect_discover().returning(|node| {
            Err(RadioError::NodeNotFound {
                node_id: node.to_string(),
                status: 1,
            })
        });
        assert!(RadioForwarder::connect(radio, "Main", 2).is_err());
    }
}
