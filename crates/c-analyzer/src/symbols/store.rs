use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use crate::symbols::{
    scope::ScopePath,
    types::{LineSpan, SymbolKind, SymbolRecord},
};

/// Pick the deterministic winner among same-named records.
///
/// Order: a record with a `typeref` beats one without; then the more specific
/// kind wins; then the earliest candidate (earliest-scanned file) is kept.
pub fn best_match<'a, I>(candidates: I) -> Option<&'a SymbolRecord>
where
    I: IntoIterator<Item = &'a SymbolRecord>,
{
    let mut best: Option<&SymbolRecord> = None;
    for candidate in candidates {
        best = match best {
            Some(current) if !outranks(candidate, current) => Some(current),
            _ => Some(candidate),
        };
    }
    best
}

fn outranks(
    candidate: &SymbolRecord,
    current: &SymbolRecord,
) -> bool {
    merge_rank(candidate) > merge_rank(current)
}

fn merge_rank(record: &SymbolRecord) -> (bool, u8) {
    (record.typeref().is_some(), record.kind().specificity())
}

#[derive(Debug, Clone)]
pub struct FunctionScope {
    pub name: String,
    pub body: LineSpan,
}

/// Merged, name-indexed view of every file in a load.
///
/// Built once per load and then only read; a new load builds a new store.
#[derive(Debug, Default)]
pub struct SymbolStore {
    records: HashMap<String, SymbolRecord>,
    sorted_names: Vec<String>,
    locals: HashMap<PathBuf, BTreeMap<String, Vec<SymbolRecord>>>,
    functions: HashMap<PathBuf, Vec<FunctionScope>>,
    claimed_scopes: Vec<ScopePath>,
    files: Vec<PathBuf>,
}

impl SymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of records into the name table.
    ///
    /// Must be followed by [`finish`](Self::finish) before querying.
    pub fn add_records<I>(
        &mut self,
        records: I,
    ) where
        I: IntoIterator<Item = SymbolRecord>,
    {
        for record in records {
            let key = record.name.to_string();
            match self.records.get_mut(&key) {
                Some(existing) => {
                    if outranks(&record, existing) {
                        *existing = record;
                    }
                },
                None => {
                    self.records.insert(key, record);
                },
            }
        }
    }

    /// Register one file's function-local records and function body spans.
    pub fn add_file(
        &mut self,
        file: &Path,
        records: &[SymbolRecord],
        locals: BTreeMap<String, Vec<SymbolRecord>>,
    ) {
        let scopes = records
            .iter()
            .filter_map(|r| {
                r.function_body().map(|body| FunctionScope {
                    name: r.name.to_string(),
                    body,
                })
            })
            .collect();
        self.functions.insert(file.to_path_buf(), scopes);
        self.locals.insert(file.to_path_buf(), locals);
        self.files.push(file.to_path_buf());
    }

    /// Rebuild the sorted key index and the member-claimed scope list.
    pub fn finish(&mut self) {
        let mut names: Vec<String> = self.records.keys().cloned().collect();
        names.sort();
        self.sorted_names = names;

        let mut claimed: Vec<ScopePath> = self
            .records
            .values()
            .filter(|r| r.kind() == SymbolKind::Member)
            .filter_map(|r| r.typeref())
            .filter(|t| t.claims_scope())
            .map(|t| t.path.clone())
            .collect();
        claimed.sort();
        claimed.dedup();
        self.claimed_scopes = claimed;
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&SymbolRecord> {
        self.records.get(name)
    }

    pub fn get_path(
        &self,
        name: &ScopePath,
    ) -> Option<&SymbolRecord> {
        self.records.get(&name.to_string())
    }

    /// All records whose name starts with `prefix`, in ascending name order.
    pub fn search_tokens(
        &self,
        prefix: &str,
    ) -> Vec<&SymbolRecord> {
        let start = self.sorted_names.partition_point(|name| name.as_str() < prefix);
        self.sorted_names[start..]
            .iter()
            .take_while(|name| name.starts_with(prefix))
            .filter_map(|name| self.records.get(name))
            .collect()
    }

    /// Locals of `function` in `file`, parameters first.
    pub fn locals(
        &self,
        file: &Path,
        function: &str,
    ) -> &[SymbolRecord] {
        self.locals.get(file).and_then(|by_fn| by_fn.get(function)).map(Vec::as_slice).unwrap_or_default()
    }

    /// Innermost function whose body spans `line` in `file`.
    pub fn function_at(
        &self,
        file: &Path,
        line: u32,
    ) -> Option<&str> {
        self.functions
            .get(file)?
            .iter()
            .filter(|scope| scope.body.contains(line))
            .min_by_key(|scope| scope.body.end - scope.body.start)
            .map(|scope| scope.name.as_str())
    }

    /// Whether `path` sits inside a scope nested below `owner` that some
    /// member's aggregate typeref claims (e.g. `S::u` typed `union:S::__anon0`
    /// claims everything under `S::__anon0`).
    pub fn is_claimed_within(
        &self,
        owner: &ScopePath,
        path: &ScopePath,
    ) -> bool {
        self.claimed_scopes
            .iter()
            .filter(|claimed| claimed.len() > owner.len() && claimed.starts_with(owner))
            .any(|claimed| path.starts_with(claimed))
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn contains_file(
        &self,
        file: &Path,
    ) -> bool {
        self.locals.contains_key(file)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every merged record in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.sorted_names.iter().filter_map(|name| self.records.get(name))
    }

    /// Records defined in `file`.
    pub fn records_in(
        &self,
        file: &Path,
    ) -> Vec<&SymbolRecord> {
        self.iter().filter(|r| r.file == file).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/src/symbols/store_tests.rs"]
mod tests;
