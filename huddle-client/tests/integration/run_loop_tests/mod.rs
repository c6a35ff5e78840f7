mod test_orchestrator_handle;
