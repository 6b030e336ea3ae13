//! Chrome process launcher

use super::browser::CdpBrowserImpl;
use super::traits::{BrowserLauncher, CdpBrowser, LaunchOptions};
use crate::Error;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tracing::{debug, info, trace};

/// Line Chrome prints on stderr once its DevTools endpoint is up
const DEVTOOLS_BANNER: &str = "DevTools listening on ";

/// Flags every launched browser gets
const BASE_ARGS: &[&str] = &[
    "--remote-debugging-port=0",
    "--disable-blink-features=AutomationControlled",
    "--disable-dev-shm-usage",
    "--no-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-crash-reporter",
    "--disable-gpu",
];

/// Executable names tried on PATH when none is configured
const CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Launches a local Chrome with a throwaway profile
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    /// Timeout applied to page navigations of launched browsers
    navigation_timeout: Duration,
}

impl ChromeLauncher {
    /// Create a new launcher
    pub fn new(navigation_timeout: Duration) -> Self {
        Self { navigation_timeout }
    }

    /// Locate a Chrome executable
    ///
    /// Order: explicit path, `CHROME_BIN`, platform install location, PATH.
    pub fn find_executable(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        #[cfg(target_os = "macos")]
        {
            let path = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
            if path.exists() {
                return Some(path);
            }
        }

        let dirs = std::env::var_os("PATH")?;
        std::env::split_paths(&dirs)
            .flat_map(|dir| CANDIDATES.iter().map(move |name| dir.join(name)))
            .find(|path| path.is_file())
    }

    /// Build the command-line arguments for a launch
    fn build_args(options: &LaunchOptions, profile_dir: &std::path::Path) -> Vec<String> {
        let mut args: Vec<String> = BASE_ARGS.iter().map(|a| a.to_string()).collect();

        args.push(format!("--user-data-dir={}", profile_dir.display()));
        args.push(format!("--window-size={},{}", options.window_width, options.window_height));

        if options.headless {
            args.push("--headless=new".to_string());
        }

        args.extend(options.args.iter().cloned());
        args.push("about:blank".to_string());
        args
    }

    /// Read stderr until Chrome reports its browser WebSocket endpoint
    async fn read_endpoint(stderr: &mut BufReader<ChildStderr>) -> Result<String, Error> {
        let mut line = String::new();
        loop {
            line.clear();
            if stderr.read_line(&mut line).await? == 0 {
                return Err(Error::session_init("Chrome exited before reporting its DevTools endpoint"));
            }

            trace!("chrome: {}", line.trim_end());

            if let Some(pos) = line.find(DEVTOOLS_BANNER) {
                return Ok(line[pos + DEVTOOLS_BANNER.len()..].trim().to_string());
            }
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, options: &LaunchOptions) -> Result<Arc<dyn CdpBrowser>, Error> {
        let executable = Self::find_executable(options.executable_path.as_deref())
            .ok_or_else(|| Error::session_init("No Chrome executable found; set chrome_path or CHROME_BIN"))?;

        let profile_dir = tempfile::Builder::new().prefix("xpost-chrome-").tempdir()?;
        let args = Self::build_args(options, profile_dir.path());

        info!("ChromeLauncher::launch: starting {}", executable.display());
        debug!("ChromeLauncher::launch: args {:?}", args);

        let mut child = Command::new(&executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::session_init(format!("Failed to start {}: {}", executable.display(), e)))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::session_init("Chrome stderr was not captured"))?;
        let mut stderr = BufReader::new(stderr);

        let endpoint = match tokio::time::timeout(options.launch_timeout, Self::read_endpoint(&mut stderr)).await {
            Ok(Ok(endpoint)) => endpoint,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(Error::session_init(format!(
                    "Chrome did not report a DevTools endpoint within {:?}",
                    options.launch_timeout
                )))
            }
        };

        // Keep the pipe drained so Chrome never blocks on a full stderr
        tokio::spawn(async move {
            let mut line = String::new();
            while let Ok(n) = stderr.read_line(&mut line).await {
                if n == 0 {
                    break;
                }
                trace!("chrome: {}", line.trim_end());
                line.clear();
            }
        });

        let browser = CdpBrowserImpl::connect(endpoint, self.navigation_timeout)
            .await
            .map_err(|e| Error::session_init(format!("Failed to attach to Chrome: {}", e)))?;
        browser.adopt_process(child, profile_dir).await;

        info!("ChromeLauncher::launch: browser ready at {}", browser.endpoint());
        Ok(Arc::new(browser))
    }
}
