// Static asset-id registry for the native UTXO assets.

pub const NEO_ASSET_ID: &str = "c56f33fc6ecfcd0c225c4ab356fee59390af8560be0e930faebe74a6daff7c9b";
pub const GAS_ASSET_ID: &str = "602c79718b16e442de58778e148d0b1084e3b2dffd5de6b7b16cee7969282de7";

static ASSETS: &[(&str, &str)] = &[
    (NEO_ASSET_ID, "NEO"),
    (GAS_ASSET_ID, "GAS"),
];

/// Resolve a protocol asset id to its ticker. Ids compare case-insensitively
/// and may carry a `0x` prefix.
pub fn symbol_for(asset_id: &str) -> Option<&'static str> {
    let id = asset_id.strip_prefix("0x").unwrap_or(asset_id);
    ASSETS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(id))
        .map(|(_, symbol)| *symbol)
}

/// Reverse lookup, mostly useful when building transactions in tests and tools.
pub fn asset_id_for(symbol: &str) -> Option<&'static str> {
    ASSETS
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(symbol))
        .map(|(id, _)| *id)
}
