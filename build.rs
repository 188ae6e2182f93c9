fn main() {
    // Only emit ESP-IDF link/env metadata when building for the device.
    // Host-target test builds skip it entirely.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
