/// Splits a payload into chunks of `size` bytes, ignoring character
/// boundaries, the way a network read would.
pub fn chunk_bytes(payload: &[u8], size: usize) -> Vec<Vec<u8>> {
    return payload
        .chunks(size.max(1))
        .map(|chunk| {
            return chunk.to_vec();
        })
        .collect();
}

/// A streamed reply body with keep-alives, a metadata frame, a malformed line
/// and multi-byte characters.
pub fn stream_fixture() -> &'static str {
    return r#"data: {"content":"Here's "}

: keep-alive

data: {"content":"how to say "}
data: not-json
data: {"meta":{"model":"gpt-4o-mini"}}

data: {"content":"héllo: "}

data: {"content":"こんにちは 👋"}

data: {"done":true}

"#;
}

pub fn codeblock_fixture() -> &'static str {
    return r#"
Here's how to print in Rust.

```rust
fn print_numbers() {
    for i in 0..=10 {
        println!("{i}");
    }
}
```

That's it!
"#
    .trim();
}
