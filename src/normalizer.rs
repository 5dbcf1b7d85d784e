/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

/// Normalizes a raw source line: drops everything from the first `;` on,
/// trims surrounding whitespace (this also swallows a trailing `\r`) and
/// uppercases the rest. Idempotent; an empty result means the line is
/// skipped entirely.
pub fn normalize(raw: &str) -> String {
    let without_comment = match raw.find(';') {
        Some(position) => &raw[..position],
        None => raw,
    };
    without_comment.trim().to_uppercase()
}

// ------------- unit tests -------------
