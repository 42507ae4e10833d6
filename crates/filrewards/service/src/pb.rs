pub mod filrewards {
    pub mod v1 {
        include!("generated/filrewards.v1.rs");
    }
}
