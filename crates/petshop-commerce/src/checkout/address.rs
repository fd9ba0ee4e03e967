//! Address types.
//!
//! Addresses are owned by the customer address book service. Checkout only
//! reads them.

use crate::ids::AddressId;
use serde::{Deserialize, Serialize};

/// A saved delivery address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Address ID.
    pub id: AddressId,
    /// Recipient name.
    pub recipient_name: String,
    /// Recipient phone number.
    pub phone: String,
    /// Street and house number.
    pub street: String,
    /// Ward (phường/xã).
    pub ward: String,
    /// District (quận/huyện).
    pub district: String,
    /// City or province.
    pub city: String,
    /// Preferred address.
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Format as single line.
    pub fn one_line(&self) -> String {
        [&self.street, &self.ward, &self.district, &self.city]
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check if address is complete enough to deliver to.
    pub fn is_complete(&self) -> bool {
        !self.recipient_name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
    }
}

/// Body for creating or replacing an address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub recipient_name: String,
    pub phone: String,
    pub street: String,
    pub ward: String,
    pub district: String,
    pub city: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    /// Attach a server-assigned id.
    pub fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            recipient_name: self.recipient_name,
            phone: self.phone,
            street: self.street,
            ward: self.ward,
            district: self.district,
            city: self.city,
            is_default: self.is_default,
        }
    }
}

impl From<&Address> for AddressInput {
    fn from(a: &Address) -> Self {
        Self {
            recipient_name: a.recipient_name.clone(),
            phone: a.phone.clone(),
            street: a.street.clone(),
            ward: a.ward.clone(),
            district: a.district.clone(),
            city: a.city.clone(),
            is_default: a.is_default,
        }
    }
}

/// The address checkout preselects: the default one, else the first.
pub fn preferred_address(addresses: &[Address]) -> Option<&Address> {
    addresses
        .iter()
        .find(|a| a.is_default)
        .or_else(|| addresses.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::address;

    #[test]
    fn test_one_line_skips_blank_parts() {
        let mut addr = address("a1", "Hồ Chí Minh", false);
        addr.ward = String::new();
        assert_eq!(addr.one_line(), "12 Le Loi, Quan 1, Hồ Chí Minh");
        assert!(addr.is_complete());
    }

    #[test]
    fn test_preferred_address() {
        let list = vec![
            address("a1", "Hà Nội", false),
            address("a2", "Hồ Chí Minh", true),
        ];
        assert_eq!(preferred_address(&list).map(|a| a.id.as_str()), Some("a2"));

        let no_default = vec![address("a1", "Hà Nội", false), address("a3", "Huế", false)];
        assert_eq!(preferred_address(&no_default).map(|a| a.id.as_str()), Some("a1"));

        assert!(preferred_address(&[]).is_none());
    }

    #[test]
    fn test_input_round_trip() {
        let addr = address("a1", "Đà Nẵng", true);
        let input = AddressInput::from(&addr);
        assert_eq!(input.into_address(AddressId::new("a1")), addr);
    }

    #[test]
    fn test_address_wire_format() {
        let addr = address("a1", "Đà Nẵng", true);
        let json = serde_json::to_value(&addr).unwrap();
        assert_eq!(json["recipientName"], "Nguyen Van A");
        assert_eq!(json["isDefault"], true);
    }
}
