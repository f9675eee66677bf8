//! # Vendor Resolver
//!
//! Maps a hardware address to its manufacturer through the bundled OUI
//! registry. Lookups are memoized per address prefix; within one scan the
//! registry is hit at most once per vendor.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use mac_oui::Oui;
use pnet::datalink::MacAddr;
use tracing::warn;

use netinv_common::probes::VendorRepository;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

fn oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("failed to load the OUI database: {e}");
                None
            }
        })
        .as_ref()
}

/// Memoizing OUI lookup. Entries are written once per prefix and only read
/// afterwards.
pub struct OuiVendorRepo {
    cache: RwLock<HashMap<[u8; 3], Option<String>>>,
}

impl OuiVendorRepo {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn lookup_registry(mac: MacAddr) -> Option<String> {
        let db = oui_db()?;
        match db.lookup_by_mac(&mac.to_string()) {
            Ok(Some(entry)) => Some(entry.company_name.clone()),
            Ok(None) => None,
            Err(e) => {
                warn!("OUI lookup failed for {mac}: {e}");
                None
            }
        }
    }
}

impl Default for OuiVendorRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl VendorRepository for OuiVendorRepo {
    fn vendor_for(&self, mac: MacAddr) -> Option<String> {
        let prefix: [u8; 3] = [mac.0, mac.1, mac.2];

        if let Ok(cache) = self.cache.read() {
            if let Some(cached) = cache.get(&prefix) {
                return cached.clone();
            }
        }

        let resolved = Self::lookup_registry(mac);
        if let Ok(mut cache) = self.cache.write() {
            cache.entry(prefix).or_insert_with(|| resolved.clone());
        }
        resolved
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_memoized_per_prefix() {
        let repo = OuiVendorRepo::new();
        let mac = MacAddr(0x02, 0x00, 0x5e, 0x10, 0x20, 0x30);

        let first = repo.vendor_for(mac);
        let second = repo.vendor_for(MacAddr(0x02, 0x00, 0x5e, 0xff, 0xee, 0xdd));

        // Same prefix, same answer, and the cache holds exactly one entry.
        assert_eq!(first, second);
        assert_eq!(repo.cache.read().unwrap().len(), 1);
    }

    #[test]
    fn locally_administered_prefix_resolves_to_none() {
        let repo = OuiVendorRepo::new();

        // x2 prefixes are locally administered and never registered.
        let vendor = repo.vendor_for(MacAddr(0x02, 0x42, 0xac, 0x11, 0x00, 0x02));
        assert_eq!(vendor, None);
    }
}
