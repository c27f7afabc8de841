//! HarvestBlueprint - Config Loader 输出
//!
//! 描述完整的采集配置：世界连接、车辆与传感器、采集与数据集输出。

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Location, SensorModality, Transform};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的采集配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HarvestBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 世界连接设置
    #[validate(nested)]
    pub world: WorldConfig,

    /// 被采集车辆
    #[validate(nested)]
    pub vehicle: VehicleConfig,

    /// 采集参数
    #[serde(default)]
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// 数据集输出参数
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// 世界连接配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorldConfig {
    /// 地图名称 (可选, e.g. "Town01")
    #[serde(default)]
    pub map: Option<String>,

    /// 世界服务地址
    #[serde(default = "default_world_host")]
    pub host: String,

    /// 世界服务端口
    #[serde(default = "default_world_port")]
    pub port: u16,
}

fn default_world_host() -> String {
    "localhost".to_string()
}

fn default_world_port() -> u16 {
    2000
}

/// 车辆配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VehicleConfig {
    /// 唯一标识符
    #[validate(length(min = 1))]
    pub id: String,

    /// 蓝图名称 (e.g. "vehicle.tesla.cybertruck")
    #[validate(length(min = 1))]
    pub blueprint: String,

    /// 初始位姿 (None = 任意空闲出生点)
    pub spawn_point: Option<Transform>,

    /// 导航目的地 (None = 不下发控制指令)
    #[serde(default)]
    pub destination: Option<Location>,

    /// 控制规划的最小路点数
    #[serde(default = "default_min_waypoint_horizon")]
    pub min_waypoint_horizon: usize,

    /// 挂载的传感器列表
    #[serde(default)]
    #[validate(nested)]
    pub sensors: Vec<SensorConfig>,
}

fn default_min_waypoint_horizon() -> usize {
    20
}

/// 传感器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SensorConfig {
    /// 唯一标识符
    #[validate(length(min = 1))]
    pub id: String,

    /// 传感器模态
    pub modality: SensorModality,

    /// 相对于父 actor 的挂载位姿
    #[serde(default)]
    pub transform: Transform,

    /// 蓝图属性 (覆盖模态默认值)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// 采集参数
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CaptureConfig {
    /// 原始数据根目录
    #[serde(default = "default_raw_data_root")]
    pub raw_data_root: PathBuf,

    /// 每个传感器队列的容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 同步轮的单次等待上限 (秒)
    #[serde(default = "default_sync_timeout_sec")]
    #[validate(range(min = 0.001))]
    pub sync_timeout_sec: f64,
}

fn default_raw_data_root() -> PathBuf {
    PathBuf::from("./raw_data")
}

fn default_queue_capacity() -> usize {
    100
}

fn default_sync_timeout_sec() -> f64 {
    1.0
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            raw_data_root: default_raw_data_root(),
            queue_capacity: default_queue_capacity(),
            sync_timeout_sec: default_sync_timeout_sec(),
        }
    }
}

/// 数据集输出参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// 输出根目录 (None = 采集目录旁的 yolo_dataset)
    #[serde(default)]
    pub output_root: Option<PathBuf>,
}

impl HarvestBlueprint {
    /// All configured sensor ids, in declaration order.
    pub fn sensor_ids(&self) -> impl Iterator<Item = &str> {
        self.vehicle.sensors.iter().map(|s| s.id.as_str())
    }

    /// First sensor of the given modality, if configured.
    pub fn first_sensor_of_modality(&self, modality: SensorModality) -> Option<&SensorConfig> {
        self.vehicle
            .sensors
            .iter()
            .find(|s| s.modality == modality)
    }
}
