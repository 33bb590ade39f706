mod content_store_tests;
