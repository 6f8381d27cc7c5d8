mod code_service_tests;
