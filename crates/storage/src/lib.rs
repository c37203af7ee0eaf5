use std::{collections::HashSet, path::Path};

use anyhow::{bail, ensure, Context, Result};
use shared::domain::{
    Branch, BranchId, BranchScope, Sor, SorId, User, UserId, UserRole, CREATED_ACTION,
};

pub mod seed;

pub use seed::Seed;

const ID_PREFIX: &str = "SOR";

/// Authoritative in-memory collections. Requests are kept newest first.
#[derive(Debug, Clone)]
pub struct Storage {
    branches: Vec<Branch>,
    users: Vec<User>,
    categories: Vec<String>,
    requests: Vec<Sor>,
    /// `None` once the counter has handed out `u32::MAX`.
    next_sequence: Option<u32>,
}

impl Storage {
    pub fn new(seed: Seed) -> Result<Self> {
        validate_seed(&seed)?;

        let next_sequence = match seed
            .requests
            .iter()
            .filter_map(|sor| sequence_of(&sor.id))
            .max()
        {
            Some(max) => max
                .checked_add(1)
                .with_context(|| format!("request sequence {max} leaves no room for new ids"))?,
            None => 1,
        };

        tracing::debug!(
            branches = seed.branches.len(),
            users = seed.users.len(),
            requests = seed.requests.len(),
            next_sequence,
            "loaded seed"
        );

        Ok(Self {
            branches: seed.branches,
            users: seed.users,
            categories: seed.categories,
            requests: seed.requests,
            next_sequence: Some(next_sequence),
        })
    }

    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let seed = Seed::from_json_file(path)?;
        Self::new(seed).with_context(|| format!("invalid seed file '{}'", path.display()))
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, branch_id: &BranchId) -> Option<&Branch> {
        self.branches.iter().find(|b| &b.id == branch_id)
    }

    /// Branch that globally scoped users file their requests against.
    pub fn default_branch(&self) -> &BranchId {
        // validate_seed guarantees at least one branch
        &self.branches[0].id
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == user_id)
    }

    pub fn first_user_with_role(&self, role: UserRole) -> Option<&User> {
        self.users.iter().find(|u| u.role == role)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn requests(&self) -> &[Sor] {
        &self.requests
    }

    pub fn request(&self, sor_id: &SorId) -> Option<&Sor> {
        self.requests.iter().find(|s| &s.id == sor_id)
    }

    pub fn request_mut(&mut self, sor_id: &SorId) -> Option<&mut Sor> {
        self.requests.iter_mut().find(|s| &s.id == sor_id)
    }

    /// Hands out `SOR-<year>-<seq>` references from a counter that only moves
    /// forward, skipping any id already present in the collection.
    pub fn allocate_request_id(&mut self, year: i32) -> Result<SorId> {
        loop {
            let Some(sequence) = self.next_sequence else {
                bail!("request id sequence exhausted");
            };
            self.next_sequence = sequence.checked_add(1);
            let candidate = SorId(format!("{ID_PREFIX}-{year}-{sequence:03}"));
            if self.request(&candidate).is_none() {
                return Ok(candidate);
            }
        }
    }

    pub fn insert_request(&mut self, sor: Sor) -> Result<()> {
        if self.request(&sor.id).is_some() {
            bail!("request id {} already exists", sor.id);
        }
        ensure!(
            self.branch(&sor.branch_id).is_some(),
            "request {} references unknown branch {}",
            sor.id,
            sor.branch_id
        );
        self.requests.insert(0, sor);
        Ok(())
    }
}

fn sequence_of(sor_id: &SorId) -> Option<u32> {
    let mut parts = sor_id.as_str().rsplitn(2, '-');
    let seq = parts.next()?;
    let head = parts.next()?;
    if !head.starts_with(ID_PREFIX) {
        return None;
    }
    seq.parse().ok()
}

fn validate_seed(seed: &Seed) -> Result<()> {
    ensure!(!seed.branches.is_empty(), "seed must define at least one branch");
    ensure!(!seed.users.is_empty(), "seed must define at least one user");

    let mut branch_ids = HashSet::new();
    for branch in &seed.branches {
        ensure!(
            branch_ids.insert(&branch.id),
            "duplicate branch id {}",
            branch.id
        );
    }

    let mut user_ids = HashSet::new();
    for user in &seed.users {
        ensure!(user_ids.insert(&user.id), "duplicate user id {}", user.id);
        if let BranchScope::Branch(branch_id) = &user.branch {
            ensure!(
                branch_ids.contains(branch_id),
                "user {} references unknown branch {}",
                user.id,
                branch_id
            );
        }
    }

    let mut request_ids = HashSet::new();
    for sor in &seed.requests {
        ensure!(request_ids.insert(&sor.id), "duplicate request id {}", sor.id);
        ensure!(
            branch_ids.contains(&sor.branch_id),
            "request {} references unknown branch {}",
            sor.id,
            sor.branch_id
        );
        let Some(first) = sor.audit_log.first() else {
            bail!("request {} has an empty audit log", sor.id);
        };
        ensure!(
            first.action == CREATED_ACTION,
            "request {} audit log must start with '{CREATED_ACTION}'",
            sor.id
        );
        ensure!(
            sor.audit_log
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp),
            "request {} audit log timestamps go backwards",
            sor.id
        );
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
