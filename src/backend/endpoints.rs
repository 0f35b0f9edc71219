//! REST path templates for the two Zephyr Scale dialects.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use super::DeploymentKind;
use crate::error::KeyError;

/// Root of the Zephyr Scale (ATM) plugin API on Jira Data Center.
pub const DATA_CENTER_NAMESPACE: &str = "/rest/atm/1.0";

/// Placeholder substituted by [`EndpointTable::path_for`].
const KEY_PLACEHOLDER: &str = "{key}";

/// Characters a key may not contain: they would end its path segment.
const FORBIDDEN_KEY_CHARS: [char; 4] = ['/', '\\', '?', '#'];

/// Bytes percent-encoded when a key is substituted into a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Checks that `key` names exactly one resource and returns it trimmed.
///
/// # Errors
///
/// Returns a [`KeyError`] for blank keys, keys containing `/`, `\`, `?`
/// or `#`, and the dot segments `.` and `..`.
pub fn check_key(key: &str) -> Result<&str, KeyError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if let Some(c) = key.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
        return Err(KeyError::ForbiddenChar(c));
    }
    if key == "." || key == ".." {
        return Err(KeyError::DotSegment);
    }
    Ok(key)
}

/// Logical REST resources used by the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    /// Test case collection (create).
    TestCases,
    /// A single test case (read, update, delete).
    TestCase,
    /// Test case search.
    TestCaseSearch,
    /// Test run collection (create).
    TestRuns,
    /// A single test run (read, update).
    TestRun,
    /// Execution results of a test run.
    TestRunResults,
    /// Test case items of a test run (append).
    TestRunTestCases,
    /// Folder collection (create).
    Folders,
}

impl Resource {
    /// Every resource, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::TestCases,
        Self::TestCase,
        Self::TestCaseSearch,
        Self::TestRuns,
        Self::TestRun,
        Self::TestRunResults,
        Self::TestRunTestCases,
        Self::Folders,
    ];

    const fn data_center_suffix(self) -> &'static str {
        match self {
            Self::TestCases => "/testcase",
            Self::TestCase => "/testcase/{key}",
            Self::TestCaseSearch => "/testcase/search",
            Self::TestRuns => "/testrun",
            Self::TestRun => "/testrun/{key}",
            Self::TestRunResults => "/testrun/{key}/testresults",
            Self::TestRunTestCases => "/testrun/{key}/testcases",
            Self::Folders => "/folder",
        }
    }

    const fn cloud_path(self) -> &'static str {
        match self {
            Self::TestCases => "/testcases",
            Self::TestCase => "/testcases/{key}",
            Self::TestCaseSearch => "/testcases/search",
            Self::TestRuns => "/testruns",
            Self::TestRun => "/testruns/{key}",
            Self::TestRunResults => "/testruns/{key}/testresults",
            Self::TestRunTestCases => "/testruns/{key}/testcases",
            Self::Folders => "/folders",
        }
    }
}

/// Mapping of logical resource to path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    templates: BTreeMap<Resource, String>,
}

impl EndpointTable {
    /// Builds the table for a deployment kind.
    #[must_use]
    pub fn for_kind(kind: DeploymentKind) -> Self {
        let templates = Resource::ALL
            .into_iter()
            .map(|resource| {
                let template = match kind {
                    DeploymentKind::DataCenter => {
                        format!("{DATA_CENTER_NAMESPACE}{}", resource.data_center_suffix())
                    }
                    DeploymentKind::Cloud => resource.cloud_path().to_string(),
                };
                (resource, template)
            })
            .collect();
        Self { templates }
    }

    /// Returns the raw template for a resource.
    #[must_use]
    pub fn template(&self, resource: Resource) -> &str {
        self.templates
            .get(&resource)
            .map_or("", String::as_str)
    }

    /// Returns the path of a keyless resource.
    #[must_use]
    pub fn path(&self, resource: Resource) -> String {
        self.template(resource).to_string()
    }

    /// Returns the path of a keyed resource with `key` substituted.
    ///
    /// The key is trimmed and percent-encoded as a single path segment.
    /// Callers validate it with [`check_key`] first.
    #[must_use]
    pub fn path_for(&self, resource: Resource, key: &str) -> String {
        let segment = utf8_percent_encode(key.trim(), PATH_SEGMENT).to_string();
        self.template(resource).replace(KEY_PLACEHOLDER, &segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_center_paths_are_namespaced() {
        let table = EndpointTable::for_kind(DeploymentKind::DataCenter);
        assert_eq!(table.path(Resource::TestCases), "/rest/atm/1.0/testcase");
        assert_eq!(
            table.path(Resource::TestCaseSearch),
            "/rest/atm/1.0/testcase/search"
        );
        assert_eq!(table.path(Resource::TestRuns), "/rest/atm/1.0/testrun");
        assert_eq!(table.path(Resource::Folders), "/rest/atm/1.0/folder");
        assert_eq!(
            table.path_for(Resource::TestCase, "PROJ-T123"),
            "/rest/atm/1.0/testcase/PROJ-T123"
        );
        assert_eq!(
            table.path_for(Resource::TestRunResults, "PROJ-C152"),
            "/rest/atm/1.0/testrun/PROJ-C152/testresults"
        );
    }

    #[test]
    fn cloud_paths_are_flat() {
        let table = EndpointTable::for_kind(DeploymentKind::Cloud);
        assert_eq!(table.path(Resource::TestCases), "/testcases");
        assert_eq!(table.path(Resource::TestCaseSearch), "/testcases/search");
        assert_eq!(table.path(Resource::TestRuns), "/testruns");
        assert_eq!(table.path(Resource::Folders), "/folders");
        assert_eq!(
            table.path_for(Resource::TestRunTestCases, "PROJ-C161"),
            "/testruns/PROJ-C161/testcases"
        );
    }

    #[test]
    fn every_resource_has_a_template() {
        for kind in [DeploymentKind::Cloud, DeploymentKind::DataCenter] {
            let table = EndpointTable::for_kind(kind);
            for resource in Resource::ALL {
                assert!(table.template(resource).starts_with('/'));
            }
        }
    }

    #[test]
    fn key_is_trimmed_before_substitution() {
        let table = EndpointTable::for_kind(DeploymentKind::Cloud);
        assert_eq!(table.path_for(Resource::TestCase, " PROJ-T1 "), "/testcases/PROJ-T1");
    }

    #[test]
    fn key_is_encoded_as_one_segment() {
        let table = EndpointTable::for_kind(DeploymentKind::DataCenter);
        assert_eq!(
            table.path_for(Resource::TestCase, "../../../../rest/api/2/myself"),
            "/rest/atm/1.0/testcase/..%2F..%2F..%2F..%2Frest%2Fapi%2F2%2Fmyself"
        );
        assert_eq!(
            table.path_for(Resource::TestCase, "PROJ-T1?x=1"),
            "/rest/atm/1.0/testcase/PROJ-T1%3Fx=1"
        );
        assert_eq!(
            table.path_for(Resource::TestRunResults, "PROJ T1#frag"),
            "/rest/atm/1.0/testrun/PROJ%20T1%23frag/testresults"
        );
    }

    #[test]
    fn check_key_accepts_ordinary_keys() {
        assert_eq!(check_key(" PROJ-T12 "), Ok("PROJ-T12"));
        assert_eq!(check_key("PROJ-C1.2"), Ok("PROJ-C1.2"));
    }

    #[test]
    fn check_key_rejects_path_syntax() {
        assert_eq!(check_key("  "), Err(KeyError::Empty));
        assert_eq!(
            check_key("../../../../rest/api/2/myself"),
            Err(KeyError::ForbiddenChar('/'))
        );
        assert_eq!(check_key("PROJ-T1?x=1"), Err(KeyError::ForbiddenChar('?')));
        assert_eq!(check_key("PROJ T1#frag"), Err(KeyError::ForbiddenChar('#')));
        assert_eq!(check_key("a\\b"), Err(KeyError::ForbiddenChar('\\')));
        assert_eq!(check_key(".."), Err(KeyError::DotSegment));
        assert_eq!(check_key(" . "), Err(KeyError::DotSegment));
    }
}
