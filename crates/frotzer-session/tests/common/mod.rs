//! Shared fixture: a scripted stand-in for dfrotz.

#![allow(dead_code)]

use std::path::PathBuf;

use frotzer_core::{FrotzerOptions, TimingOptions};
use frotzer_session::Session;

/// Game file name the fixture creates.
pub const GAME_FILE: &str = "Ruins.z5";

/// A tiny interactive game: prints a banner, answers a few verbs, writes
/// and reads save files, and exits after `quit` + `yes`. The game file path
/// arrives as `$1`, the way dfrotz receives it.
const INTERPRETER: &str = r#"
game=$(basename "$1")
has_idol=no

printf 'RUINS\nAn interactive fixture\nStory file: %s\n\nForest Clearing\nTall trees surround a crumbling temple.\n\n>' "$game"

while IFS= read -r line; do
    case "$line" in
        "")
            printf '\nI beg your pardon?\n\n>' ;;
        look)
            if [ "$has_idol" = yes ]; then
                printf '\nForest Clearing\nTall trees surround a crumbling temple. The altar is bare.\n\n>'
            else
                printf '\nForest Clearing\nTall trees surround a crumbling temple. A golden idol rests on the altar.\n\n>'
            fi ;;
        "take idol")
            has_idol=yes
            printf '\nTaken.\n\n>' ;;
        "drop idol")
            has_idol=no
            printf '\nDropped.\n\n>' ;;
        inventory)
            if [ "$has_idol" = yes ]; then
                printf '\nYou are carrying:\n  a golden idol\n\n>'
            else
                printf '\nYou are empty-handed.\n\n>'
            fi ;;
        save)
            printf 'Please enter a filename [ruins.qzl]: '
            IFS= read -r file
            printf 'has_idol=%s\n' "$has_idol" > "$file"
            printf 'Ok.\n\n>' ;;
        restore)
            printf 'Please enter a filename [ruins.qzl]: '
            IFS= read -r file
            has_idol=$(sed -n 's/^has_idol=//p' "$file")
            printf 'Ok.\n\n>' ;;
        slow)
            printf '\nThe wind '
            sleep 0.05
            printf 'howls through the columns.\n\n>' ;;
        wait)
            ;;
        die)
            exit 3 ;;
        quit)
            printf '\nAre you sure you want to quit? '
            IFS= read -r answer
            if [ "$answer" = yes ]; then
                exit 0
            fi
            printf '\nOk.\n\n>' ;;
        *)
            printf '\nI do not know the word "%s".\n\n>' "$line" ;;
    esac
done
"#;

/// Shaped like dfrotz on a story that waits for a key before its intro: the
/// opening output is only a key prompt, and the intro is the reply to the
/// first line read.
pub const KEY_PROMPT_INTERPRETER: &str = r#"
printf '[Please press SPACE to begin.]\n'
IFS= read -r key
printf '\nDays of searching, days of thirsty hacking through the briars of the\nforest, but at last your patience was rewarded. A discovery!\n\nRuins\nYou stand among broken columns.\n\n>'

while IFS= read -r line; do
    case "$line" in
        look)
            printf '\nRuins\nYou stand among broken columns.\n\n>' ;;
        quit)
            printf '\nAre you sure you want to quit? '
            IFS= read -r answer
            [ "$answer" = yes ] && exit 0
            printf '\nOk.\n\n>' ;;
        *)
            printf '\nI beg your pardon?\n\n>' ;;
    esac
done
"#;

/// Temporary directory holding the interpreter script, the game file and
/// the save directory. Removed on drop.
pub struct Fixture {
    /// Root of the fixture
    pub dir: PathBuf,
}

impl Fixture {
    /// Create a fixture unique to `name` and this test process.
    pub fn new(name: &str) -> Self {
        Self::with_script(name, INTERPRETER)
    }

    /// Create a fixture running `script` as the interpreter.
    pub fn with_script(name: &str, script: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "frotzer-it-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("interpreter.sh"), script).unwrap();
        std::fs::write(dir.join(GAME_FILE), b"").unwrap();
        Self { dir }
    }

    /// Directory the session saves into.
    pub fn save_dir(&self) -> PathBuf {
        self.dir.join("saves")
    }

    /// Complete options pointing at the fixture.
    pub fn options(&self) -> FrotzerOptions {
        FrotzerOptions {
            executable: Some(PathBuf::from("sh")),
            args: Some(vec![self.dir.join("interpreter.sh").display().to_string()]),
            game_file: Some(GAME_FILE.to_string()),
            story_dir: Some(self.dir.clone()),
            save_dir: Some(self.save_dir()),
            timing: Some(TimingOptions {
                response_timeout_ms: Some(5_000),
                drain_grace_ms: Some(100),
                exit_timeout_ms: Some(2_000),
            }),
            ..FrotzerOptions::default()
        }
    }

    /// A ready session pointing at the fixture.
    pub fn session(&self) -> Session {
        Session::with_options(&self.options()).unwrap()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Route logs to the test harness.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
