pub mod built_info {
    use lazy_static::lazy_static;
    include!(concat!(env!("OUT_DIR"), "/built.rs"));

    lazy_static! {
        /// Version of the software as reported by `--version`
        pub static ref VERSION: String = PKG_VERSION.to_string();
    }
}
