fn main() {
    // Plugins resolve malloc/realloc/calloc against the harness binary's
    // exported interposition hooks; that requires the binary's dynamic
    // symbol table to include them.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("linux") {
        println!("cargo:rustc-link-arg-bins=-rdynamic");
    }
}
