use std::{collections::HashSet, path::Path};

use tracing::debug;

use crate::{
    engine::chain::{ends_with_accessor, extract_access_chain},
    symbols::{
        ScopePath, SymbolDetail, SymbolKind, SymbolRecord, SymbolStore, scope::is_anonymous_segment,
        type_text::declared_type,
    },
};

/// Upper bound on alias/member hops while normalizing a type.
const MAX_TYPE_STEPS: usize = 32;

/// Query view over one published store, scoped to a function of a file.
pub struct Resolver<'a> {
    store: &'a SymbolStore,
    locals: &'a [SymbolRecord],
}

impl<'a> Resolver<'a> {
    pub fn new(
        store: &'a SymbolStore,
        file: &Path,
        function: Option<&str>,
    ) -> Self {
        let locals = function.map(|function| store.locals(file, function)).unwrap_or_default();
        Self {
            store,
            locals,
        }
    }

    /// Members of the type reached by the access chain ending `expression`.
    ///
    /// Without `full_chain` the last link is the partial word being typed and
    /// is not walked.
    pub fn resolve_members(
        &self,
        expression: &str,
        full_chain: bool,
    ) -> Vec<&'a SymbolRecord> {
        let chain = extract_access_chain(expression);
        let Some((root, links)) = chain.split_first() else {
            return Vec::new();
        };
        if root.is_empty() {
            return Vec::new();
        }
        let links = if full_chain {
            links
        } else {
            &links[..links.len().saturating_sub(1)]
        };

        let Some(root_record) = self.find_root(root) else {
            debug!("[resolve] no root for {root}");
            return Vec::new();
        };
        let Some(root_type) = self.type_of(root_record) else {
            return Vec::new();
        };

        let mut base = self.base_type(root_type);
        for link in links {
            if link.is_empty() {
                return Vec::new();
            }
            base = self.base_type(base.child(link));
        }
        debug!("[resolve] {expression:?} -> {base}");
        self.members_of(&base)
    }

    /// Locals of the current function first, then store variables.
    fn find_root(
        &self,
        name: &str,
    ) -> Option<&'a SymbolRecord> {
        if let Some(local) = self.locals.iter().find(|r| r.name.len() == 1 && r.short_name() == name) {
            return Some(local);
        }
        self.store.get(name).filter(|r| r.kind() == SymbolKind::Variable)
    }

    /// Type named by a record: parameter spelling, typeref, or the declared
    /// type parsed from its source text.
    fn type_of(
        &self,
        record: &SymbolRecord,
    ) -> Option<ScopePath> {
        let path = match &record.detail {
            SymbolDetail::Parameter {
                type_name,
            } => ScopePath::parse(type_name),
            _ => match record.typeref() {
                Some(typeref) => typeref.path.clone(),
                None => ScopePath::parse(&declared_type(&record.search_text)?),
            },
        };
        if path.is_empty() {
            return None;
        }
        Some(self.qualify(record, path))
    }

    /// Resolve `path` against the scopes enclosing `record`, innermost first,
    /// when it is not a known name on its own.
    fn qualify(
        &self,
        record: &SymbolRecord,
        path: ScopePath,
    ) -> ScopePath {
        if self.store.get_path(&path).is_some() {
            return path;
        }
        let mut scope = record.name.parent();
        while let Some(outer) = scope {
            let candidate = outer.join(&path);
            if self.store.get_path(&candidate).is_some() {
                return candidate;
            }
            scope = outer.parent();
        }
        path
    }

    /// Follow aliases and member types down to an aggregate (or the last name
    /// reached).
    pub fn base_type(
        &self,
        start: ScopePath,
    ) -> ScopePath {
        let mut current = start;
        let mut visited: HashSet<ScopePath> = HashSet::new();

        for _ in 0..MAX_TYPE_STEPS {
            if !visited.insert(current.clone()) {
                break;
            }
            let next = match self.store.get_path(&current) {
                Some(record) => match &record.detail {
                    SymbolDetail::Alias {
                        ..
                    }
                    | SymbolDetail::Member {
                        ..
                    } => self.type_of(record),
                    _ => None,
                },
                None => self.promoted_member_type(&current),
            };
            match next {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }

    /// `outer::tag` is not a record: look for `tag` promoted out of an
    /// anonymous aggregate under `outer`, skipping claimed scopes.
    fn promoted_member_type(
        &self,
        path: &ScopePath,
    ) -> Option<ScopePath> {
        let outer = path.parent()?;
        let tag = path.last()?;
        let candidate = self
            .store
            .search_tokens(&outer.member_prefix())
            .into_iter()
            .find(|r| r.short_name() == tag && !self.store.is_claimed_within(&outer, &r.name))?;
        self.type_of(candidate)
    }

    /// Records directly under `base`, plus those promoted through anonymous
    /// aggregates no member below `base` claims.
    pub fn members_of(
        &self,
        base: &ScopePath,
    ) -> Vec<&'a SymbolRecord> {
        if base.is_empty() {
            return Vec::new();
        }
        let candidates = self.store.search_tokens(&base.member_prefix());
        // Promoted members claim too: `inner` typed `struct:S::__anon0::__anon0`
        // hides that scope even though `inner` itself sits under `S::__anon0`.
        let claimed: Vec<ScopePath> = candidates
            .iter()
            .filter_map(|r| r.typeref())
            .filter(|t| t.claims_scope() && t.path.len() > base.len() && t.path.starts_with(base))
            .map(|t| t.path.clone())
            .collect();

        candidates
            .into_iter()
            .filter(|record| {
                if record.name.is_anonymous() {
                    return false;
                }
                let Some(rest) = record.name.strip_prefix(base) else {
                    return false;
                };
                let Some((_, tags)) = rest.split_last() else {
                    return false;
                };
                if !tags.iter().all(|segment| is_anonymous_segment(segment)) {
                    return false;
                }
                !(1..=tags.len()).any(|n| {
                    let tag_path = base.join(&ScopePath::from_segments(tags[..n].iter().cloned()));
                    claimed.contains(&tag_path)
                })
            })
            .collect()
    }

    /// Every local of the current function, then non-member store matches.
    pub fn complete(
        &self,
        prefix: &str,
    ) -> Vec<&'a SymbolRecord> {
        let mut out: Vec<&SymbolRecord> = self.locals.iter().collect();
        out.extend(self.store.search_tokens(prefix).into_iter().filter(|r| r.kind() != SymbolKind::Member));
        out
    }

    /// Record for `word`, given the line text before it.
    pub fn symbol_at(
        &self,
        line_prefix: &str,
        word: &str,
    ) -> Option<&'a SymbolRecord> {
        if word.is_empty() {
            return None;
        }
        if ends_with_accessor(line_prefix) {
            let expression = format!("{}{word}", line_prefix.trim_end());
            if let Some(member) = self.resolve_members(&expression, false).into_iter().find(|r| r.short_name() == word) {
                return Some(member);
            }
            // Qualified name spelled out in full, e.g. `geo::Shape::area`.
            let chain = extract_access_chain(&expression);
            return self.store.get_path(&ScopePath::from_segments(chain));
        }
        self.locals
            .iter()
            .find(|r| r.name.len() == 1 && r.short_name() == word)
            .or_else(|| self.store.get(word))
    }
}

#[cfg(test)]
#[path = "../../tests/src/engine/resolve_tests.rs"]
mod tests;
