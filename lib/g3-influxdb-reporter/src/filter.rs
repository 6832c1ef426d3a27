/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use regex::RegexSet;
use yaml_rust::Yaml;

const PATTERN_PREFIX_GLOB: &str = "glob:";
const PATTERN_PREFIX_REGEX: &str = "regex:";

/// Accept / reject rule for tag keys.
///
/// A key is accepted if it matches one of the includes and none of the
/// excludes. An empty include list matches every key.
///
/// Patterns are globs unless prefixed with `regex:`. In a glob, `**` matches
/// any sequence, `*` matches any sequence without `.` and `?` matches a single
/// character.
#[derive(Clone, Debug)]
pub struct TagFilter {
    includes: Option<RegexSet>,
    excludes: Option<RegexSet>,
}

impl TagFilter {
    pub fn accept_all() -> Self {
        TagFilter {
            includes: None,
            excludes: None,
        }
    }

    pub fn new<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> anyhow::Result<Self> {
        let includes = build_set(includes).context("invalid include pattern")?;
        let excludes = build_set(excludes).context("invalid exclude pattern")?;
        Ok(TagFilter { includes, excludes })
    }

    pub fn accept(&self, key: &str) -> bool {
        if let Some(excludes) = &self.excludes {
            if excludes.is_match(key) {
                return false;
            }
        }
        match &self.includes {
            Some(includes) => includes.is_match(key),
            None => true,
        }
    }

    pub(crate) fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!("yaml value type for tag filter should be 'map'"));
        };

        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        crate::config::foreach_kv(map, |k, v| match crate::config::normalize(k).as_str() {
            "includes" | "include" => {
                includes = crate::config::value::as_list(v, crate::config::value::as_string)?;
                Ok(())
            }
            "excludes" | "exclude" => {
                excludes = crate::config::value::as_list(v, crate::config::value::as_string)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        TagFilter::new(&includes, &excludes)
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        TagFilter::accept_all()
    }
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> anyhow::Result<Option<RegexSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut regexes = Vec::with_capacity(patterns.len());
    for p in patterns {
        regexes.push(pattern_to_regex(p.as_ref())?);
    }
    let set = RegexSet::new(&regexes).map_err(|e| anyhow!("{e}"))?;
    Ok(Some(set))
}

fn pattern_to_regex(pattern: &str) -> anyhow::Result<String> {
    if let Some(r) = pattern.strip_prefix(PATTERN_PREFIX_REGEX) {
        if r.is_empty() {
            return Err(anyhow!("empty regex pattern"));
        }
        Ok(format!("^(?:{r})$"))
    } else {
        let glob = pattern
            .strip_prefix(PATTERN_PREFIX_GLOB)
            .unwrap_or(pattern);
        if glob.is_empty() {
            return Err(anyhow!("empty glob pattern"));
        }
        Ok(glob_to_regex(glob))
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut r = String::with_capacity(glob.len() * 2 + 2);
    r.push('^');
    let mut chars = glob.chars().peekable();
    let mut literal = String::new();
    while let Some(c) = chars.next() {
        match c {
            '*' | '?' => {
                r.push_str(&regex::escape(&literal));
                literal.clear();
                if c == '?' {
                    r.push('.');
                } else if chars.peek() == Some(&'*') {
                    chars.next();
                    r.push_str(".*");
                } else {
                    r.push_str("[^.]*");
                }
            }
            _ => literal.push(c),
        }
    }
    r.push_str(&regex::escape(&literal));
    r.push('$');
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    #[test]
    fn glob() {
        assert_eq!(glob_to_regex("**"), "^.*$");
        assert_eq!(glob_to_regex("a.*"), "^a\\.[^.]*$");
        assert_eq!(glob_to_regex("a?c"), "^a.c$");
    }

    #[test]
    fn accept_all() {
        let filter = TagFilter::accept_all();
        assert!(filter.accept("anything"));
        assert!(filter.accept(""));
    }

    #[test]
    fn include_exclude() {
        let filter = TagFilter::new(&["**"], &["secret*", "regex:tmp_[0-9]+"]).unwrap();
        assert!(filter.accept("env"));
        assert!(!filter.accept("secret"));
        assert!(!filter.accept("secret_key"));
        assert!(!filter.accept("tmp_12"));
        assert!(filter.accept("tmp_x"));
    }

    #[test]
    fn include_only() {
        let filter = TagFilter::new(&["glob:env", "host"], &[]).unwrap();
        assert!(filter.accept("env"));
        assert!(filter.accept("host"));
        assert!(!filter.accept("hostname"));
        assert!(!filter.accept("zone"));
    }

    #[test]
    fn single_star_stops_at_dot() {
        let filter = TagFilter::new(&["k8s.*"], &[]).unwrap();
        assert!(filter.accept("k8s.pod"));
        assert!(!filter.accept("k8s.pod.name"));
    }

    #[test]
    fn invalid() {
        assert!(TagFilter::new(&["regex:("], &[]).is_err());
        assert!(TagFilter::new(&["regex:"], &[]).is_err());
        assert!(TagFilter::new(&[""], &[]).is_err());
    }

    #[test]
    fn yaml() {
        let docs = YamlLoader::load_from_str(
            "includes: ['**']\nexcludes:\n  - secret*\n  - regex:^id$\n",
        )
        .unwrap();
        let filter = TagFilter::parse_yaml(&docs[0]).unwrap();
        assert!(filter.accept("env"));
        assert!(!filter.accept("secret"));
        assert!(!filter.accept("id"));

        let docs = YamlLoader::load_from_str("exclude: password").unwrap();
        let filter = TagFilter::parse_yaml(&docs[0]).unwrap();
        assert!(!filter.accept("password"));
        assert!(filter.accept("user"));

        let docs = YamlLoader::load_from_str("unknown: []").unwrap();
        assert!(TagFilter::parse_yaml(&docs[0]).is_err());

        let docs = YamlLoader::load_from_str("- a").unwrap();
        assert!(TagFilter::parse_yaml(&docs[0]).is_err());
    }
}
