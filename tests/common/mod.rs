use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stands in for `credstash`: one file per stored key under `<root>/<env>/`,
/// `getall` prints `<root>/<env>.dump`, every call is appended to `calls.log`.
const FAKE_CREDSTASH: &str = r#"#!/bin/sh
root="$FAKE_STORE_DIR"
env="$2"
action="$3"
shift 3
[ "$1" = "--" ] && shift
key="$1"
value="$2"
echo "$action $env $key" >> "$root/calls.log"
case "$action" in
  getall)
    [ -f "$root/$env.dump" ] || { echo "table $env not found" >&2; exit 1; }
    cat "$root/$env.dump"
    ;;
  delete)
    [ -f "$root/$env/$key" ] || { echo "$key not found" >&2; exit 1; }
    rm "$root/$env/$key"
    ;;
  put)
    [ "$key" = "$FAKE_REJECT_KEY" ] && { echo "rejected" >&2; exit 1; }
    mkdir -p "$root/$env"
    [ -f "$root/$env/$key" ] && { echo "$key version 1 is already in the credential store" >&2; exit 1; }
    printf '%s' "$value" > "$root/$env/$key"
    echo "$key has been stored"
    ;;
  *)
    exit 64
    ;;
esac
"#;

pub struct FakeStore {
    tmp: TempDir,
    bin: PathBuf,
}

impl FakeStore {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let bin = tmp.path().join("credstash");
        fs::write(&bin, FAKE_CREDSTASH).expect("write fake credstash");
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).expect("chmod fake credstash");
        Self { tmp, bin }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn with_dump(self, env: &str, dump: &str) -> Self {
        fs::write(self.root().join(format!("{env}.dump")), dump).expect("write dump");
        self
    }

    pub fn seed(&self, env: &str, key: &str, value: &str) {
        let dir = self.root().join(env);
        fs::create_dir_all(&dir).expect("create env dir");
        fs::write(dir.join(key), value).expect("seed key");
    }

    pub fn stored(&self, env: &str, key: &str) -> Option<String> {
        fs::read_to_string(self.root().join(env).join(key)).ok()
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("calls.log"))
            .map(|s| s.lines().map(|l| l.trim_end().to_string()).collect())
            .unwrap_or_default()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("credstash-transfer");
        cmd.env("FAKE_STORE_DIR", self.root())
            .env("CREDSTASH_BIN", &self.bin)
            .env_remove("RUST_LOG");
        cmd
    }
}
