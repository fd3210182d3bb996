pub mod local_asset_store;
