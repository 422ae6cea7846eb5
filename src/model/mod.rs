//! 定义了库对外暴露的核心数据模型。

pub mod outcome;
pub mod track;
