#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use diff_dispatch::{DiffKind, DiffParser};
use libfuzzer_sys::fuzz_target;
use serde_json::{json, Value};

#[derive(Arbitrary, Debug)]
struct FuzzDiff {
    blocks: Vec<FuzzBlock>,
}

#[derive(Arbitrary, Debug)]
struct FuzzBlock {
    path: Vec<FuzzSegment>,
    value_prev: Option<FuzzValue>,
    value_post: Option<FuzzValue>,
    context_lines: u8,
}

#[derive(Arbitrary, Debug)]
enum FuzzSegment {
    Key(String),
    Index(u32),
}

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Number(i64),
    String(String),
    Array(Vec<FuzzValue>),
    Object(Vec<(String, FuzzValue)>),
}

impl FuzzValue {
    fn to_json(&self) -> Value {
        match self {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(*b),
            FuzzValue::Number(n) => json!(n),
            FuzzValue::String(s) => Value::String(s.clone()),
            FuzzValue::Array(arr) => Value::Array(arr.iter().map(|v| v.to_json()).collect()),
            FuzzValue::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl FuzzBlock {
    fn has_value_line(&self) -> bool {
        self.value_prev.is_some() || self.value_post.is_some()
    }

    /// `null` values count as absent.
    fn expected_kind(&self) -> Option<DiffKind> {
        let present = |value: &Option<FuzzValue>| {
            value.as_ref().is_some_and(|v| !matches!(v, FuzzValue::Null))
        };
        DiffKind::classify(present(&self.value_prev), present(&self.value_post))
    }

    fn render(&self, out: &mut String) {
        let path: Vec<Value> = self
            .path
            .iter()
            .map(|segment| match segment {
                FuzzSegment::Key(key) => json!(key),
                FuzzSegment::Index(index) => json!(index),
            })
            .collect();

        out.push_str(&format!("@ {}\n", Value::Array(path)));
        for _ in 0..self.context_lines % 3 {
            out.push_str("  {\"id\":\"context\"}\n");
        }
        if let Some(prev) = &self.value_prev {
            out.push_str(&format!("- {}\n", prev.to_json()));
        }
        if let Some(post) = &self.value_post {
            out.push_str(&format!("+ {}\n", post.to_json()));
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(diff) = FuzzDiff::arbitrary(&mut u) else {
        return;
    };

    let mut text = String::new();
    for block in &diff.blocks {
        block.render(&mut text);
    }

    let results: Vec<_> = DiffParser::new(text.as_bytes(), "fuzz.diff").collect();

    // Blocks without value lines end the stream with an error; null-only
    // blocks yield nothing.
    let mut expected = Vec::new();
    let mut ends_in_error = false;
    for block in &diff.blocks {
        if !block.has_value_line() {
            ends_in_error = true;
            break;
        }
        if let Some(kind) = block.expected_kind() {
            expected.push((kind, block.path.len()));
        }
    }

    let expected_len = expected.len() + usize::from(ends_in_error);
    assert_eq!(results.len(), expected_len);

    for ((kind, depth), result) in expected.iter().zip(&results) {
        let entry = result.as_ref().expect("well-formed block failed to parse");
        assert_eq!(entry.kind(), *kind);
        assert_eq!(entry.path().segments().len(), *depth);
    }

    if ends_in_error {
        assert!(results[expected.len()].is_err());
    }
});
