//! Service discovery and service identity.
//!
//! One service per device that delivered data. The identity combines the
//! device name with the tail of its serial number so a swapped disk shows up
//! as a new service instead of silently inheriting the old one's history.

use serde::Serialize;

use crate::describe::serial_suffix;
use crate::section::{DeviceRecord, Section};

/// Placeholder used in the identity when the device reports no serial.
pub const NO_SERIAL: &str = "no-serial";

/// Service item under which one device is monitored, e.g. `/dev/sda (34567890)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceIdentity(String);

impl ServiceIdentity {
    pub fn new(device_name: &str, serial: &str) -> Self {
        let suffix = if serial.is_empty() {
            NO_SERIAL
        } else {
            serial_suffix(serial)
        };
        ServiceIdentity(format!("{device_name} ({suffix})"))
    }

    /// Wrap an item string received from the monitoring host.
    pub fn from_item(item: impl Into<String>) -> Self {
        ServiceIdentity(item.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Device name this identity refers to, judged from the item alone.
    ///
    /// Strips the trailing `" (<suffix>)"`. Items not in that form are taken
    /// as a bare device name. Use [`ServiceIdentity::locate`] when a section
    /// is at hand; a serial containing `" ("` makes this split ambiguous.
    pub fn device_name(&self) -> &str {
        self.0
            .strip_suffix(')')
            .and_then(|rest| rest.rsplit_once(" ("))
            .map(|(device, _)| device.trim())
            .unwrap_or_else(|| self.0.trim())
    }

    /// Find the device this identity refers to in `section`.
    ///
    /// A data record whose own identity equals this one wins. Otherwise the
    /// longest device name that the item names (bare, or followed by
    /// `" (<suffix>)"`) is taken, which covers error records and swapped
    /// disks.
    pub fn locate<'a>(&self, section: &'a Section) -> Option<(&'a str, &'a DeviceRecord)> {
        let exact = section.iter().find(|(device, record)| {
            record
                .as_data()
                .is_some_and(|data| ServiceIdentity::new(device, &data.serial) == *self)
        });
        if let Some((device, record)) = exact {
            return Some((device.as_str(), record));
        }

        section
            .iter()
            .filter(|(device, _)| self.names_device(device))
            .max_by_key(|(device, _)| device.len())
            .map(|(device, record)| (device.as_str(), record))
    }

    fn names_device(&self, device: &str) -> bool {
        let item = self.0.trim();
        item == device
            || item
                .strip_prefix(device)
                .and_then(|rest| rest.strip_prefix(" ("))
                .is_some_and(|suffix| suffix.ends_with(')'))
    }
}

impl std::fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One identity per device with a data record, in section order.
///
/// Devices whose collection failed are not discovered; they cannot be
/// identified without a serial number.
pub fn discover(section: &Section) -> Vec<ServiceIdentity> {
    section
        .iter()
        .filter_map(|(device, record)| match record {
            DeviceRecord::Data(data) => Some(ServiceIdentity::new(device, &data.serial)),
            DeviceRecord::Error(error) => {
                tracing::debug!(device = %device, error = %error.message, "Not discovering failed device");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::parse_section;

    fn rows(rows: &[&[&str]]) -> Section {
        parse_section(
            rows.iter()
                .map(|r| r.iter().map(|f| f.to_string()).collect::<Vec<_>>()),
        )
    }

    #[test]
    fn identity_uses_last_eight_serial_characters() {
        assert_eq!(
            ServiceIdentity::new("/dev/sda", "1234567890").as_str(),
            "/dev/sda (34567890)"
        );
        assert_eq!(
            ServiceIdentity::new("/dev/sda", "ABC").as_str(),
            "/dev/sda (ABC)"
        );
        assert_eq!(
            ServiceIdentity::new("/dev/sda", "").as_str(),
            "/dev/sda (no-serial)"
        );
    }

    #[test]
    fn device_name_inverts_identity() {
        for (device, serial) in [
            ("/dev/sda", "1234567890"),
            ("/dev/sdb", ""),
            ("/dev/disk/by-id/wwn (odd)", "XYZ"),
        ] {
            let identity = ServiceIdentity::new(device, serial);
            assert_eq!(identity.device_name(), device);
        }
    }

    #[test]
    fn bare_item_is_a_device_name() {
        assert_eq!(ServiceIdentity::from_item("/dev/sdq").device_name(), "/dev/sdq");
    }

    #[test]
    fn serial_with_parenthesis_still_locates_its_device() {
        let section = rows(&[
            &["/dev/sda", r#"{"serial": "WD (A1234", "model": "M"}"#],
            &["/dev/sdb", r#"{"serial": "OTHER"}"#],
        ]);
        let identity = discover(&section)
            .into_iter()
            .next()
            .expect("sda is discovered");
        assert_eq!(identity.as_str(), "/dev/sda (D (A1234)");

        let (device, record) = identity.locate(&section).expect("device located");
        assert_eq!(device, "/dev/sda");
        assert!(record.as_data().is_some());
    }

    #[test]
    fn locate_falls_back_to_device_prefix() {
        let section = rows(&[
            &["/dev/sda", "ERROR", "timeout"],
            &["/dev/sd", r#"{"serial": "X"}"#],
        ]);
        let (device, _) = ServiceIdentity::from_item("/dev/sda (OLDSERIAL)")
            .locate(&section)
            .expect("error record located");
        assert_eq!(device, "/dev/sda");

        assert!(ServiceIdentity::from_item("/dev/sdq (X)").locate(&section).is_none());
        assert_eq!(
            ServiceIdentity::from_item("/dev/sd").locate(&section).map(|(d, _)| d),
            Some("/dev/sd")
        );
    }

    #[test]
    fn error_records_are_not_discovered() {
        let section = rows(&[
            &["/dev/sda", r#"{"serial": "1234567890"}"#],
            &["/dev/sdb", "ERROR", "timeout"],
            &["/dev/sdc", "{broken"],
        ]);
        let services = discover(&section);
        assert_eq!(services, vec![ServiceIdentity::new("/dev/sda", "1234567890")]);
    }

    #[test]
    fn identity_is_stable_across_parses() {
        let blob = r#"{"serial": "WD-WCC4N0123456"}"#;
        let first = discover(&rows(&[&["/dev/sda", blob]]));
        let second = discover(&rows(&[&["/dev/sda", blob]]));
        assert_eq!(first, second);
        assert_eq!(first[0].as_str(), "/dev/sda (N0123456)");
    }
}
