mod station_scenario_tests;
