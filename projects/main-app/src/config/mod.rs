use std::{env, net::SocketAddr, time::Duration};

use tracing::Level;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub bind_addr: SocketAddr,
    pub camera_device: String,
    pub camera_user_device: Option<String>,
    pub camera_input_format: String,
    pub camera_torch_control: String,
    pub camera_start_timeout: Duration,
    pub log_level: Level,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Webcam Capture".to_owned());
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
            .parse()?;

        let camera_device = env::var("CAMERA_DEVICE").unwrap_or_else(|_| "/dev/video0".to_owned());
        let camera_user_device = env::var("CAMERA_USER_DEVICE")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let camera_input_format =
            env::var("CAMERA_INPUT_FORMAT").unwrap_or_else(|_| "mjpeg".to_owned());
        let camera_torch_control =
            env::var("CAMERA_TORCH_CONTROL").unwrap_or_else(|_| "flash_led_mode".to_owned());
        let camera_start_timeout = env::var("CAMERA_START_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(5000));
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse::<Level>().ok())
            .unwrap_or(Level::INFO);

        Ok(Self {
            app_name,
            bind_addr,
            camera_device,
            camera_user_device,
            camera_input_format,
            camera_torch_control,
            camera_start_timeout,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::PathBuf,
        sync::{Mutex, OnceLock},
        time::{Duration, SystemTime, UNIX_EPOCH},
    };

    use tracing::Level;

    use super::AppConfig;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("failed to lock env mutex")
    }

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    fn from_env_uses_camera_defaults() {
        let _guard = lock_env();
        for key in [
            "CAMERA_DEVICE",
            "CAMERA_USER_DEVICE",
            "CAMERA_TORCH_CONTROL",
            "CAMERA_START_TIMEOUT_MS",
            "LOG_LEVEL",
        ] {
            remove_env(key);
        }
        set_env("BIND_ADDR", "127.0.0.1:8080");

        let config = AppConfig::from_env().expect("config should parse");
        assert_eq!(config.camera_device, "/dev/video0");
        assert_eq!(config.camera_user_device, None);
        assert_eq!(config.camera_torch_control, "flash_led_mode");
        assert_eq!(config.camera_start_timeout, Duration::from_millis(5000));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn from_env_ignores_blank_user_device_and_bad_numbers() {
        let _guard = lock_env();
        set_env("BIND_ADDR", "127.0.0.1:8080");
        set_env("CAMERA_USER_DEVICE", "   ");
        set_env("CAMERA_START_TIMEOUT_MS", "soon");
        set_env("LOG_LEVEL", "debug");

        let config = AppConfig::from_env().expect("config should parse");
        assert_eq!(config.camera_user_device, None);
        assert_eq!(config.camera_start_timeout, Duration::from_millis(5000));
        assert_eq!(config.log_level, Level::DEBUG);

        remove_env("CAMERA_USER_DEVICE");
        remove_env("CAMERA_START_TIMEOUT_MS");
        remove_env("LOG_LEVEL");
    }

    #[test]
    fn from_env_rejects_invalid_bind_addr() {
        let _guard = lock_env();
        set_env("BIND_ADDR", "not-an-address");

        assert!(AppConfig::from_env().is_err());
        set_env("BIND_ADDR", "127.0.0.1:8080");
    }

    #[test]
    fn from_env_reads_devices_from_dotenv_file() {
        let _guard = lock_env();
        remove_env("CAMERA_DEVICE");
        set_env("BIND_ADDR", "127.0.0.1:8080");

        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        let path: PathBuf = std::env::temp_dir().join(format!("webcam-dotenv-{suffix}.env"));
        fs::write(
            &path,
            "CAMERA_DEVICE=/dev/video4\nCAMERA_USER_DEVICE=/dev/video6\n",
        )
        .expect("should write temporary dotenv file");

        dotenvy::from_path_override(&path).expect("dotenv file should load");
        let config = AppConfig::from_env().expect("config should parse");
        assert_eq!(config.camera_device, "/dev/video4");
        assert_eq!(config.camera_user_device.as_deref(), Some("/dev/video6"));

        remove_env("CAMERA_DEVICE");
        remove_env("CAMERA_USER_DEVICE");
        let _ = fs::remove_file(path);
    }
}
