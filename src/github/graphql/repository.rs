use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryVariable {
    pub owner: String,
    pub repository_name: String,
}

pub fn repository_query() -> String {
    r#"
        query($owner: String!, $repository_name: String!) {
            repository(owner: $owner, name: $repository_name) {
                nameWithOwner
                description
                url
                isPrivate
                isArchived
                stargazerCount
                forkCount
                primaryLanguage {
                    name
                }
                defaultBranchRef {
                    name
                }
                createdAt
                updatedAt
            }
        }
    "#
    .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryResponse {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name_with_owner: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub stargazer_count: u64,
    #[serde(default)]
    pub fork_count: u64,
    pub primary_language: Option<NamedNode>,
    pub default_branch_ref: Option<NamedNode>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedNode {
    pub name: String,
}
