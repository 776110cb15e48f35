/*!
# `jsondig` Library

Pulls values out of JSON-shaped documents with slash-delimited path
expressions such as `servers/{*}/ip`.

```
use jsondig::path;
use serde_json::json;

let doc = json!({"v": [1, 2, 3]});
let total = path::evaluate(&doc, "v", &json!(0), &["SumFromList"])
    .expect("Invalid path");
assert_eq!(total, json!(6));
```
*/

pub mod formats;
pub mod path;
pub mod tree;
mod utils;

pub use utils::*;
