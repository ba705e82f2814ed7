fn main() {
    println!("cargo:rerun-if-env-changed=REELNAME_REVISION");
    slint_build::compile("ui/main_window.slint").expect("Slint UI compilation failed");
}
