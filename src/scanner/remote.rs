//! Remote reference selection and shallow fetch

use std::num::NonZeroU32;
use std::sync::atomic::AtomicBool;

use gix::bstr::ByteSlice;
use gix::remote::Direction;

use crate::scanner::error::{ScanError, ScanResult};

/// Branches tried, in order, when looking for the default branch
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

const HEADS_PREFIX: &str = "refs/heads/";
const LISTING_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";
// Reported by gix when no advertised ref matches the refspecs
const NO_MAPPING: &str = "None of the refspec";

/// An advertised branch and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    pub name: String,
    pub id: gix::ObjectId,
}

impl BranchTip {
    pub fn reference(&self) -> String {
        format!("{}{}", HEADS_PREFIX, self.name)
    }

    /// Fetch refspec writing the branch to its remote-tracking ref
    fn refspec(&self) -> String {
        format!("+{}:refs/remotes/origin/{}", self.reference(), self.name)
    }
}

/// Pick the first of [`DEFAULT_BRANCHES`] among advertised `(ref name, id)` pairs
pub fn choose_branch<'a, I>(advertised: I) -> Option<BranchTip>
where
    I: IntoIterator<Item = (&'a str, gix::ObjectId)>,
{
    let advertised: Vec<_> = advertised.into_iter().collect();
    DEFAULT_BRANCHES.iter().find_map(|branch| {
        advertised.iter().find_map(|(name, id)| {
            (name.strip_prefix(HEADS_PREFIX) == Some(*branch)).then(|| BranchTip {
                name: branch.to_string(),
                id: *id,
            })
        })
    })
}

/// List the remote's branches and choose the default one
///
/// A remote without any branch yields `None`, like one lacking both candidates.
pub fn default_branch(repo: &gix::Repository, url: &str) -> ScanResult<Option<BranchTip>> {
    let remote = repo
        .remote_at(url)
        .map_err(|e| ScanError::remote(url, e))?
        .with_refspecs([LISTING_REFSPEC], Direction::Fetch)
        .map_err(|e| ScanError::remote(url, e))?;
    let connection = remote
        .connect(Direction::Fetch)
        .map_err(|e| ScanError::remote(url, e))?;
    let prepare = match connection.prepare_fetch(gix::progress::Discard, Default::default()) {
        Ok(prepare) => prepare,
        Err(e) if e.to_string().contains(NO_MAPPING) => {
            log::debug!("'{}' has no branches", url);
            return Ok(None);
        }
        Err(e) => return Err(ScanError::remote(url, e)),
    };

    let advertised: Vec<(String, gix::ObjectId)> = prepare
        .ref_map()
        .mappings
        .iter()
        .filter_map(|mapping| {
            let name = mapping.remote.as_name()?.to_str().ok()?.to_string();
            let id = mapping.remote.as_id()?.to_owned();
            Some((name, id))
        })
        .collect();
    log::debug!("'{}' advertised {} branches", url, advertised.len());

    Ok(choose_branch(
        advertised.iter().map(|(name, id)| (name.as_str(), *id)),
    ))
}

/// Fetch only `branch`, one commit deep
pub fn fetch_shallow(repo: &gix::Repository, url: &str, branch: &BranchTip) -> ScanResult<()> {
    let remote = repo
        .remote_at(url)
        .map_err(|e| ScanError::remote(url, e))?
        .with_refspecs([branch.refspec().as_str()], Direction::Fetch)
        .map_err(|e| ScanError::remote(url, e))?;
    let connection = remote
        .connect(Direction::Fetch)
        .map_err(|e| ScanError::remote(url, e))?;

    connection
        .prepare_fetch(gix::progress::Discard, Default::default())
        .map_err(|e| ScanError::remote(url, e))?
        .with_shallow(gix::remote::fetch::Shallow::DepthAtRemote(NonZeroU32::MIN))
        .receive(gix::progress::Discard, &AtomicBool::new(false))
        .map_err(|e| ScanError::remote(url, e))?;

    log::debug!("Fetched {} from '{}'", branch.reference(), url);
    Ok(())
}
