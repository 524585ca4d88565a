// This binary crate is intentionally minimal.
// All neural network logic lives in the library (src/lib.rs and its modules).
// Run the demo with:
//   cargo run --example xor
fn main() {
    println!("lamina: a feed-forward neural network library in Rust.");
    println!("Run `cargo run --example xor` to see the XOR demo.");
}
