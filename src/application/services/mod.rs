pub mod availability_service;

pub mod notifier;

pub mod poll_orchestrator;

pub mod scheduler;
