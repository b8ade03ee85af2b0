//! Backend routes
//!
//! Every URL is derived from the configured server URL; path segments are percent-encoded.
use crate::run::RunRequest;
use url::Url;

fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    // Cannot-be-a-base URLs are rejected when the config is built.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn with_contexts(mut url: Url, contexts: &[String]) -> Url {
    if !contexts.is_empty() {
        let mut query = url.query_pairs_mut();
        for context in contexts {
            query.append_pair("contexts", context);
        }
    }
    url
}

pub fn profiles(base: &Url) -> Url {
    endpoint(base, &["api", "user", "performance", "profiles"])
}

pub fn profile(base: &Url, id: &str) -> Url {
    endpoint(base, &["api", "user", "performance", "profiles", id])
}

/// Run endpoint of a profile: context parameters, `cert=true`, then the run parameters.
pub fn run(base: &Url, profile_id: &str, contexts: &[String], request: &RunRequest) -> Url {
    let url = endpoint(
        base,
        &["api", "user", "performance", "profiles", profile_id, "run"],
    );
    let mut url = with_contexts(url, contexts);
    url.query_pairs_mut()
        .append_pair("cert", "true")
        .extend_pairs(request.params());
    url
}

pub fn user_prefs(base: &Url, contexts: &[String]) -> Url {
    with_contexts(endpoint(base, &["api", "user", "prefs"]), contexts)
}

pub fn static_board(base: &Url) -> Url {
    endpoint(base, &["api", "telemetry", "metrics", "static-board"])
}

pub fn smp_meshes(base: &Url) -> Url {
    endpoint(base, &["api", "mesh"])
}

pub fn graphql(base: &Url) -> Url {
    endpoint(base, &["api", "system", "graphql"])
}

/// Download link for the raw result of a completed run.
pub fn result(base: &Url, result_id: &str) -> Url {
    endpoint(base, &["api", "perf", "profile", "result", result_id])
}
