//! Thread-local cache of compiled ast-grep patterns.
//!
//! Capped at 256 entries; the whole cache is dropped when full.

use crate::sg::AstGrepError;
use ast_grep_core::Pattern;
use ast_grep_language::SupportLang;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    // Keyed by language too: TSX and TypeScript parse `<T>(x)` differently.
    static PATTERN_CACHE: RefCell<HashMap<String, Pattern>> =
        RefCell::new(HashMap::new());
}

/// Compiled `pattern` for `lang`, from the cache when possible.
pub fn get_or_compile_pattern(pattern: &str, lang: SupportLang) -> Result<Pattern, AstGrepError> {
    let key = format!("{lang:?}:{pattern}");
    PATTERN_CACHE.with(|cache| {
        if let Some(compiled) = cache.borrow().get(&key) {
            return Ok(compiled.clone());
        }
        let compiled =
            Pattern::try_new(pattern, lang).map_err(|e| AstGrepError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        let mut cache = cache.borrow_mut();
        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(key, compiled.clone());
        Ok(compiled)
    })
}

pub fn clear_cache() {
    PATTERN_CACHE.with(|cache| cache.borrow_mut().clear());
}

pub fn cache_size() -> usize {
    PATTERN_CACHE.with(|cache| cache.borrow().len())
}
